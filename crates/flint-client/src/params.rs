//! 类型化配置叠加层：以“键类型即键”的方式存放客户端定制参数。
//!
//! # 教案式概览
//! - **意图（Why）**：客户端的定制维度（凭据、默认库、字符集、连接池水位）彼此独立，
//!   若用字符串键承载会把解析歧义留给运行期。此处让每个配置维度以一个独立类型表达，
//!   键类型同时决定值类型与缺省值，查询因此永不失败。
//! - **结构（How）**：[`StackParams`] 内部以 `TypeId -> Arc<dyn Any>` 的有序映射存储条目；
//!   [`StackParam`] 契约要求每个条目类型自带缺省值。写入走 [`StackParams::with`]，
//!   复制一份小映射并替换单个条目，原值对其他持有者保持逐字节可复用。
//! - **契约（What）**：同一键类型至多一个值，后写覆盖先写；[`StackParams::get`] 为全函数，
//!   未设置的键解析为该类型的缺省值。所有操作无副作用。
//! - **风险提示（Trade-offs）**：写入时整表复制，代价与条目数线性相关；配置条目通常
//!   不超过十余个，换取无锁共享与持久化语义是值得的。若未来条目规模膨胀，
//!   可替换为持久化树结构而不改动对外契约。

use alloc::{collections::BTreeMap, sync::Arc};
use core::any::{Any, TypeId};
use core::fmt;

/// 类型化配置条目的契约：实现类型既是键也是值。
///
/// # 设计背景（Why）
/// - 对齐 Tower/Finagle 一脉的 "typed stack params" 实践：键的类型系统身份
///   （`TypeId`）保证了值类型在编译期就已确定，杜绝字符串键的取值歧义。
///
/// # 契约说明（What）
/// - **缺省值**：[`default_value`](Self::default_value) 必须是全函数，任何时刻调用
///   都能构造出语义合理的缺省值，这是 [`StackParams::get`] 永不失败的前提；
/// - **线程安全**：条目会以 `Arc` 形式跨线程共享，因此要求 `Send + Sync + 'static`；
/// - **克隆语义**：`get` 返回值的独立副本，条目类型应保证克隆成本可接受
///   （推荐小型值对象或内部 `Arc`）。
pub trait StackParam: Clone + Send + Sync + 'static {
    /// 构造该配置维度的缺省值；键未被设置时查询将返回此值。
    fn default_value() -> Self;
}

/// 不可变的类型化键值叠加层。
///
/// # 契约速览
/// - **语义**：每个键类型至多一个值，后写覆盖先写；读取永不失败（缺省值兜底）。
/// - **纯函数**：[`with`](Self::with) 返回携带新条目的副本，接收者保持不变，
///   其他键的取值在新旧两份叠加层之间逐一相等（非干涉性）。
/// - **并发**：实例一旦构造便不再变化，可在并发调用方之间自由共享，无需同步原语。
#[derive(Clone, Default)]
pub struct StackParams {
    entries: BTreeMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl StackParams {
    /// 构造空的叠加层：所有键都解析为各自的缺省值。
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取键类型 `P` 对应的值；未设置时返回 `P::default_value()`。
    ///
    /// # 契约说明
    /// - **全函数**：任何键在任何叠加层上的查询都有定义，调用方无需处理缺失分支；
    /// - **输出**：值的独立克隆，后续对叠加层的派生不影响已取出的副本。
    pub fn get<P: StackParam>(&self) -> P {
        self.entries
            .get(&TypeId::of::<P>())
            .and_then(|entry| entry.downcast_ref::<P>())
            .cloned()
            .unwrap_or_else(P::default_value)
    }

    /// 判断键类型 `P` 是否被显式设置过（缺省值兜底不计入）。
    pub fn contains<P: StackParam>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<P>())
    }

    /// 返回携带新条目的叠加层副本；接收者保持不变。
    ///
    /// # 契约说明
    /// - **后写覆盖**：若 `P` 已设置，新值取代旧值；
    /// - **非干涉性**：除 `P` 之外的所有键在新副本上的取值与接收者一致；
    /// - **幂等性**：以相同值重复调用，产出的叠加层观察等价。
    pub fn with<P: StackParam>(&self, value: P) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(TypeId::of::<P>(), Arc::new(value));
        Self { entries }
    }

    /// 显式设置过的条目数量。
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否不含任何显式条目。
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for StackParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 条目以类型擦除形式存放，仅能展示规模信息。
        f.debug_struct("StackParams")
            .field("entries", &self.entries.len())
            .finish()
    }
}
