#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![doc = "flint-client: 协议无关的客户端装配核心。"]
#![doc = ""]
#![doc = "== 定位 =="]
#![doc = "本 crate 回答的问题是：一个请求/响应线缆协议的网络客户端如何被**装配**与**配置**。"]
#![doc = "有序可组合的模块栈（中间件流水线）把行为层叠在真正的传输/派发端点之外，"]
#![doc = "一组类型化、不可变的配置值同时定制中间件与端点构造，二者共同构成可复用的装配机制。"]
#![doc = ""]
#![doc = "== 职责边界 =="]
#![doc = "线缆帧的编解码、会话建立/鉴权握手、连接传输及其池化负载均衡、以及把帧流转成"]
#![doc = "请求/响应对的派发器，均为外部协作方（黑盒工厂），装配核心只负责调用与穿线。"]
#![doc = ""]
#![doc = "== 内存分配依赖 =="]
#![doc = "核心契约依赖 [`alloc`] 中的 `Box`、`Arc`、`Vec` 等类型支撑模块折叠与对象安全的"]
#![doc = "异步接口；纯 `no_std`（无分配器）环境暂不支持。"]

extern crate alloc;

/// 对象安全异步契约统一经由 `async_trait` 表达，向下游复用同一份导出。
pub use async_trait::async_trait;

pub mod client;
pub mod dump;
pub mod endpoint;
pub mod error;
pub mod params;
pub mod stack;
pub mod trace;

pub use client::{
    ClientConfiguration, Dispatcher, Resolve, ResolvedTarget, Transporter,
    params::{Charset, Credentials, Database, PoolBounds, PoolIdleTimeout, PoolMaxWaiters},
};
pub use dump::hex_dump;
pub use endpoint::{ArcEndpoint, ArcEndpointFactory, Endpoint, EndpointFactory};
pub use error::{ClientError, Result};
pub use params::{StackParam, StackParams};
pub use stack::{Role, Stack, StackModule};
pub use trace::{
    AnnotationValue, ClassifyRequest, NoopTraceSink, RequestVariant, TraceAnnotation, TraceSink,
    TraceSinkParam, TracingModule,
};
