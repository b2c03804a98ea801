//! 客户端公开配置面的类型化条目集合。
//!
//! 每个条目都实现 [`StackParam`](crate::params::StackParam)：类型即键，自带缺省值，
//! 通过 [`ClientConfiguration::configured`](crate::client::ClientConfiguration::configured)
//! 或对应的 `with_*` 便捷方法写入叠加层。条目之间彼此独立、叠加互不清除。

use alloc::string::String;
use core::time::Duration;

use crate::params::StackParam;

/// 会话凭据：用户名与口令，两者独立可设。
///
/// # 契约说明（What）
/// - 缺省两者皆空，表示匿名会话（是否允许由协议握手裁决）；
/// - 装配核心只存储并在物化时把该条目随叠加层递交给派发器，绝不解释其内容。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl StackParam for Credentials {
    fn default_value() -> Self {
        Self {
            username: None,
            password: None,
        }
    }
}

/// 会话建立后要选择的默认数据库。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Database(pub Option<String>);

impl StackParam for Database {
    fn default_value() -> Self {
        Self::default()
    }
}

/// 会话字符集的数值编码。
///
/// 缺省值 `33` 是线缆协议沿用的经典 UTF-8 排序规则编码。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset(pub u16);

impl Charset {
    /// 经典 UTF-8 排序规则编码。
    pub const UTF8: Self = Self(33);
}

impl StackParam for Charset {
    fn default_value() -> Self {
        Self::UTF8
    }
}

/// 连接池高低水位提示，由外部池化模块消费。
///
/// # 契约说明（What）
/// - `low`：池维持的最小连接数；`high`：允许的最大连接数；
/// - 装配核心不解释该条目，仅随叠加层递交给消费方；
/// - 缺省值不设上限，等价于"不施加池化约束"。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolBounds {
    pub low: usize,
    pub high: usize,
}

impl StackParam for PoolBounds {
    fn default_value() -> Self {
        Self {
            low: 0,
            high: usize::MAX,
        }
    }
}

/// 空闲连接的回收时限提示；`None` 表示不回收。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolIdleTimeout(pub Option<Duration>);

impl StackParam for PoolIdleTimeout {
    fn default_value() -> Self {
        Self::default()
    }
}

/// 池满时允许排队等待的最大请求数提示。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolMaxWaiters(pub usize);

impl StackParam for PoolMaxWaiters {
    fn default_value() -> Self {
        Self(usize::MAX)
    }
}
