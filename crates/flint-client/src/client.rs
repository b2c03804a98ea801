//! 客户端配置：{模块栈, 配置叠加层} 的不可变聚合与物化入口。
//!
//! # 教案式概览
//! - **意图（Why）**：调用方以链式、不可变的 `with_*` 变换定制客户端；所有定制只触碰
//!   配置叠加层或（概念上的）模块栈，传输与派发代码保持黑盒。物化（[`materialize`]）
//!   是通用装配核心与协议特定机制之间唯一的集成接缝。
//! - **结构（How）**：[`ClientConfiguration`] 持有 [`Stack`] 与 [`StackParams`]；
//!   每个定制方法返回新值，未变更的组件以 `Arc`/克隆共享。物化时先经
//!   [`Resolve`] 解析逻辑目的地，再用 [`Transporter`] 与 [`Dispatcher`] 两个外部
//!   构造器搭出终端工厂，最后把栈折叠上去。
//! - **契约（What)**：缺省实例的叠加层为空、栈内已含追踪模块（构造时插入一次，
//!   位于终端工厂自带的池化/连接管理之外层）；任何定制方法都不改动接收者。
//! - **风险提示（Trade-offs）**：物化预期每个逻辑客户端执行一次（非每请求）；
//!   物化产物的并发安全由外部提供的传输/派发实现负责。
//!
//! [`materialize`]: ClientConfiguration::materialize

pub mod params;

use alloc::{borrow::Cow, string::String, sync::Arc};
use core::fmt;

use async_trait::async_trait;

use crate::endpoint::{ArcEndpoint, ArcEndpointFactory, EndpointFactory};
use crate::params::{StackParam, StackParams};
use crate::stack::Stack;
use crate::trace::{ClassifyRequest, TracingModule};

use self::params::{Charset, Credentials, Database};

/// 逻辑目的地解析后的目标描述。
///
/// 对装配核心不透明：核心只负责把它原样递交给传输构造器，
/// 字段格式与解析机制是解析器协作方的契约。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// 解析产出的目标地址（主机、集群名或供应商自定义形态）。
    pub authority: Cow<'static, str>,
    /// 面向观测与池隔离的客户端标签。
    pub label: Cow<'static, str>,
}

/// 逻辑目的地解析接缝（外部协作方）。
pub trait Resolve: Send + Sync + 'static {
    /// 把逻辑目的地与标签解析为目标描述。
    fn resolve(&self, destination: &str, label: &str) -> crate::Result<ResolvedTarget>;
}

/// 传输构造接缝（外部协作方）：给定已解析目标与配置叠加层，建立不透明传输通道。
///
/// # 契约说明（What）
/// - `Transport` 是协议实现自定义的通道句柄，装配核心从不窥探其内部；
/// - `transport` 的每次调用都允许建立新的通道；复用与池化是上层模块的职责；
/// - 失败以 [`ClientError`](crate::ClientError) 表达（推荐错误码
///   [`codes::TRANSPORT_UNAVAILABLE`](crate::error::codes::TRANSPORT_UNAVAILABLE)）。
#[async_trait]
pub trait Transporter: Send + Sync + 'static {
    /// 协议自定义的传输通道句柄。
    type Transport: Send + 'static;

    /// 建立到 `target` 的传输通道；`params` 为物化时的完整配置叠加层。
    async fn transport(
        &self,
        target: &ResolvedTarget,
        params: &StackParams,
    ) -> crate::Result<Self::Transport>;
}

/// 请求派发接缝（外部协作方）：把活跃传输与完整会话参数装配为请求/响应端点。
pub trait Dispatcher<Req, Rsp>: Send + Sync + 'static
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    /// 与配套 [`Transporter`] 一致的通道句柄类型。
    type Transport: Send + 'static;

    /// 基于活跃传输与会话参数产出端点；会话建立/鉴权握手的细节由实现负责。
    fn dispatch(&self, transport: Self::Transport, session: &StackParams) -> ArcEndpoint<Req, Rsp>;
}

/// 由传输构造器与派发器搭成的终端端点工厂，是栈折叠的最内层。
struct TerminalFactory<T, D> {
    transporter: Arc<T>,
    dispatcher: Arc<D>,
    target: ResolvedTarget,
    params: StackParams,
}

#[async_trait]
impl<Req, Rsp, T, D> EndpointFactory<Req, Rsp> for TerminalFactory<T, D>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
    T: Transporter,
    D: Dispatcher<Req, Rsp, Transport = T::Transport>,
{
    async fn make(&self) -> crate::Result<ArcEndpoint<Req, Rsp>> {
        let transport = self
            .transporter
            .transport(&self.target, &self.params)
            .await?;
        Ok(self.dispatcher.dispatch(transport, &self.params))
    }
}

/// 客户端配置：模块栈与配置叠加层的不可变聚合。
///
/// # 契约速览
/// - **生命周期**：每种协议客户端存在一个规范缺省值（[`new`](Self::new)/`Default`，
///   协议 crate 可将其包装为惰性初始化的静态常量）；一切定制都是纯派生，绝无原地修改；
///   对象在物化时被消费语义地折叠为可承载流量的端点工厂。
/// - **并发**：纯值，可跨并发调用方自由共享，无需同步。
pub struct ClientConfiguration<Req, Rsp>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    stack: Stack<Req, Rsp>,
    params: StackParams,
}

impl<Req, Rsp> ClientConfiguration<Req, Rsp>
where
    Req: ClassifyRequest + Send + 'static,
    Rsp: Send + 'static,
{
    /// 构造规范缺省配置：空叠加层，栈内已含追踪模块。
    ///
    /// # 契约说明
    /// - 追踪模块在此处插入**一次**，位于终端工厂自带的池化/连接管理缺省之外层；
    /// - 其采集器从叠加层读取（[`TraceSinkParam`](crate::trace::TraceSinkParam)），
    ///   缺省为空实现，因此缺省配置开箱即用。
    pub fn new() -> Self {
        Self {
            stack: Stack::new().push_back(Arc::new(TracingModule)),
            params: StackParams::new(),
        }
    }
}

impl<Req, Rsp> Default for ClientConfiguration<Req, Rsp>
where
    Req: ClassifyRequest + Send + 'static,
    Rsp: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Rsp> ClientConfiguration<Req, Rsp>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    /// 访问模块栈。
    pub fn stack(&self) -> &Stack<Req, Rsp> {
        &self.stack
    }

    /// 访问配置叠加层。
    pub fn params(&self) -> &StackParams {
        &self.params
    }

    /// 返回替换了模块栈的新配置；叠加层共享不变。
    pub fn with_stack(&self, stack: Stack<Req, Rsp>) -> Self {
        Self {
            stack,
            params: self.params.clone(),
        }
    }

    /// 通用定制入口：返回写入任意类型化条目后的新配置。
    ///
    /// # 契约说明
    /// - 叠加层语义（后写覆盖、非干涉、幂等）逐条继承自
    ///   [`StackParams::with`](crate::params::StackParams::with)；
    /// - 栈原样共享，接收者不受影响。
    pub fn configured<P: StackParam>(&self, entry: P) -> Self {
        Self {
            stack: self.stack.clone(),
            params: self.params.with(entry),
        }
    }

    /// 返回设置了会话凭据的新配置。
    pub fn with_credentials(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.configured(Credentials {
            username: Some(username.into()),
            password: Some(password.into()),
        })
    }

    /// 返回设置了默认数据库的新配置。
    pub fn with_database(&self, name: impl Into<String>) -> Self {
        self.configured(Database(Some(name.into())))
    }

    /// 返回设置了会话字符集编码的新配置。
    pub fn with_charset(&self, code: u16) -> Self {
        self.configured(Charset(code))
    }

    /// 物化：解析目的地，搭建终端工厂，并把栈折叠上去。
    ///
    /// # 契约说明（What）
    /// - **输入**：逻辑目的地与标签交由 `resolver` 解析（机制外部）；
    ///   `transporter`/`dispatcher` 是协议特定的两个黑盒构造器，
    ///   物化时把已解析目标与完整叠加层递交给它们；
    /// - **输出**：装配完成的端点工厂——序列首个模块行为位于最外层，
    ///   终端工厂在最内层负责建连与派发；
    /// - **频次**：预期每个逻辑客户端装配一次；工厂产物的并发安全由协议实现负责；
    /// - **失败**：仅解析失败在此处返回；此后的建连/握手失败经由工厂的
    ///   `make` 原样透传。
    pub fn materialize<R, T, D>(
        &self,
        destination: &str,
        label: &str,
        resolver: &R,
        transporter: Arc<T>,
        dispatcher: Arc<D>,
    ) -> crate::Result<ArcEndpointFactory<Req, Rsp>>
    where
        R: Resolve + ?Sized,
        T: Transporter,
        D: Dispatcher<Req, Rsp, Transport = T::Transport>,
    {
        let target = resolver.resolve(destination, label)?;
        let terminal: ArcEndpointFactory<Req, Rsp> = Arc::new(TerminalFactory {
            transporter,
            dispatcher,
            target,
            params: self.params.clone(),
        });
        Ok(self.stack.fold(terminal, &self.params))
    }

    /// 物化并立即产出一个可用端点（[`materialize`](Self::materialize) 的便捷形态）。
    pub async fn materialize_endpoint<R, T, D>(
        &self,
        destination: &str,
        label: &str,
        resolver: &R,
        transporter: Arc<T>,
        dispatcher: Arc<D>,
    ) -> crate::Result<ArcEndpoint<Req, Rsp>>
    where
        R: Resolve + ?Sized,
        T: Transporter,
        D: Dispatcher<Req, Rsp, Transport = T::Transport>,
    {
        self.materialize(destination, label, resolver, transporter, dispatcher)?
            .make()
            .await
    }
}

// 手写 Clone：派生实现会对 Req/Rsp 追加不必要的 `Clone` 约束。
impl<Req, Rsp> Clone for ClientConfiguration<Req, Rsp>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            params: self.params.clone(),
        }
    }
}

impl<Req, Rsp> fmt::Debug for ClientConfiguration<Req, Rsp>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfiguration")
            .field("stack", &self.stack)
            .field("params", &self.params)
            .finish()
    }
}
