//! 请求/响应端点与端点工厂的对象安全契约。
//!
//! # 教案式概览
//! - **意图（Why）**：模块栈需要一个稳定的"被包装物"形态。把端点与端点工厂都定义为
//!   对象安全的异步 Trait，模块转换便可以用 `Arc<dyn …>` 在折叠时自由嵌套，
//!   而不强迫协作方暴露具体类型。
//! - **结构（How）**：[`Endpoint`] 承载单次请求的异步调用；[`EndpointFactory`] 负责
//!   产出端点（典型实现会在 `make` 中建立传输连接并装配派发器）。两者均通过
//!   [`async_trait`] 获得对象安全的异步方法。
//! - **契约（What)**：`call` 消费请求值并返回响应或 [`ClientError`](crate::ClientError)；
//!   `make` 每次调用都可能产出新的端点实例，复用与池化是上层模块的职责。
//! - **风险提示（Trade-offs）**：`async_trait` 为每次调用装箱 Future，换取对象安全；
//!   装配核心不在热路径上做零拷贝承诺，协议实现若有极致性能诉求可在终端工厂内部内联。

use alloc::{boxed::Box, sync::Arc};

use async_trait::async_trait;

/// 请求/响应端点：一次调用消费一个请求值，异步产出响应。
///
/// # 契约说明（What）
/// - **输入**：`request` 为协议自定义的请求类型，按值传入；
/// - **输出**：`Future` 完成时给出响应或错误，错误语义由终端端点定义；
/// - **并发**：实现必须 `Send + Sync`，同一端点可能被多个任务并发调用，
///   其内部并发安全是协议实现（而非装配核心）的义务。
#[async_trait]
pub trait Endpoint<Req, Rsp>: Send + Sync + 'static
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    /// 发起一次请求并等待响应。
    async fn call(&self, request: Req) -> crate::Result<Rsp>;
}

/// 共享所有权的端点别名，模块折叠与流量路径统一使用该形态。
pub type ArcEndpoint<Req, Rsp> = Arc<dyn Endpoint<Req, Rsp>>;

/// 端点工厂：按需产出可用端点。
///
/// # 契约说明（What）
/// - `make` 的每次调用都允许产出全新端点（典型行为是建立一条新传输连接）；
/// - 端点的复用、池化与负载均衡由包裹在外层的模块或协议实现负责；
/// - 失败以 [`ClientError`](crate::ClientError) 表达，装配核心原样向外透传。
#[async_trait]
pub trait EndpointFactory<Req, Rsp>: Send + Sync + 'static
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    /// 产出一个可用端点。
    async fn make(&self) -> crate::Result<ArcEndpoint<Req, Rsp>>;
}

/// 共享所有权的端点工厂别名；[`Stack::fold`](crate::stack::Stack::fold) 的输入与输出均为该形态。
pub type ArcEndpointFactory<Req, Rsp> = Arc<dyn EndpointFactory<Req, Rsp>>;
