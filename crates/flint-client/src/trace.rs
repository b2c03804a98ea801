//! 追踪模块：识别出站协议操作的变体，并在委派前发出结构化追踪注解。
//!
//! # 教案式概览
//! - **意图（Why）**：排障与链路分析需要知道每次出站调用"是什么操作、携带什么语句"。
//!   把这类观测以模块形态层叠在端点工厂之外，传输与派发代码完全无感知。
//! - **结构（How）**：[`TracingModule`] 实现 [`StackModule`]，折叠时从配置叠加层读取
//!   [`TraceSinkParam`] 指定的外部采集器；运行期对每个请求执行一次分类
//!   （[`ClassifyRequest`]），发出一条 [`TraceAnnotation`]，随后无条件同步委派给
//!   被包裹的端点。
//! - **契约（What)**：注解发射假定不失败（fire-and-forget）；请求与响应内容绝不被
//!   修改，委派失败原样透传，模块自身从不因追踪而失败、从不抑制或重试。
//! - **风险提示（Trade-offs）**：语句文本按原样进入注解值，若存在敏感字面量，
//!   应由采集器一侧脱敏；模块不做采样，高 QPS 链路请在采集器上控制开销。

use alloc::{borrow::Cow, string::String, sync::Arc, vec::Vec};
use core::fmt;

use async_trait::async_trait;

use crate::endpoint::{ArcEndpoint, ArcEndpointFactory, Endpoint, EndpointFactory};
use crate::params::{StackParam, StackParams};
use crate::stack::{Role, StackModule};

/// 文本型操作（查询）的注解键。
pub const QUERY_ANNOTATION_KEY: &str = "protocol.query";
/// 预编译语句准备操作的注解键。
pub const PREPARE_ANNOTATION_KEY: &str = "protocol.prepare";
/// 预编译语句执行操作的注解键。
pub const EXECUTE_ANNOTATION_KEY: &str = "protocol.execute";

/// 出站协议操作的封闭分类。
///
/// # 契约说明（What）
/// - 每个变体携带构造注解所需的数据：文本型操作带语句字面量，预编译执行带不透明
///   语句标识；无法归类的请求落入 [`Other`](Self::Other)，注解键退化为请求类型名。
/// - 分类纯粹是观测用途，对控制流没有任何影响。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestVariant<'a> {
    /// 文本查询，携带语句字面量。
    Query(&'a str),
    /// 预编译语句的准备操作，携带语句字面量。
    Prepare(&'a str),
    /// 预编译语句的执行操作，携带语句标识。
    ExecutePrepared(u32),
    /// 其余未归类操作。
    Other,
}

/// 协议请求类型向追踪模块暴露自身变体的契约。
///
/// # 设计背景（Why）
/// - 装配核心不解析线缆帧（职责边界），但追踪需要操作语义；由协议请求类型自行
///   实现该契约，是在不打破边界的前提下获取语义的最小接口。
pub trait ClassifyRequest {
    /// 返回本请求的变体分类。
    fn variant(&self) -> RequestVariant<'_>;
}

/// 追踪注解的值域：字符串或二进制。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnnotationValue {
    /// 文本值（语句字面量等）。
    Text(Cow<'static, str>),
    /// 二进制值（不透明标识等）。
    Binary(Vec<u8>),
}

/// 发往外部追踪采集器的结构化注解。
///
/// # 契约说明（What）
/// - `key` 为低基数稳定字符串（如 `protocol.query`）；
/// - `value` 由请求载荷派生：文本型操作取语句字面量，预编译执行取大端序语句标识；
/// - 注解纯属观测，不影响控制流。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceAnnotation {
    pub key: Cow<'static, str>,
    pub value: AnnotationValue,
}

impl TraceAnnotation {
    /// 构造文本注解。
    pub fn text(key: impl Into<Cow<'static, str>>, value: impl Into<Cow<'static, str>>) -> Self {
        Self {
            key: key.into(),
            value: AnnotationValue::Text(value.into()),
        }
    }

    /// 构造二进制注解。
    pub fn binary(key: impl Into<Cow<'static, str>>, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            value: AnnotationValue::Binary(value),
        }
    }
}

/// 外部追踪采集器的接缝。
///
/// # 契约说明（What）
/// - [`record`](Self::record) 假定始终可用且不失败（fire-and-forget）；
/// - 实现应保证非阻塞——追踪模块在委派**之前**同步调用该方法，阻塞会拖慢全部出站流量。
pub trait TraceSink: Send + Sync + 'static {
    /// 记录一条注解。
    fn record(&self, annotation: TraceAnnotation);
}

/// 丢弃一切注解的空实现，是 [`TraceSinkParam`] 的缺省值。
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTraceSink;

impl TraceSink for NoopTraceSink {
    fn record(&self, _annotation: TraceAnnotation) {}
}

/// 指定追踪采集器的配置条目。
///
/// # 设计背景（Why）
/// - 模块变换所需的配置一律从折叠时传入的叠加层读取（栈契约），采集器因此以
///   配置条目而非构造参数的形式注入；缺省为 [`NoopTraceSink`]，保证叠加层查询
///   永不失败、缺省装配开箱即用。
#[derive(Clone)]
pub struct TraceSinkParam(pub Arc<dyn TraceSink>);

impl StackParam for TraceSinkParam {
    fn default_value() -> Self {
        Self(Arc::new(NoopTraceSink))
    }
}

impl fmt::Debug for TraceSinkParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TraceSinkParam(..)")
    }
}

/// 追踪模块：一个具体的 [`StackModule`]。
///
/// # 契约速览
/// - **角色**：固定为 [`TracingModule::ROLE`]，按约定全局唯一；
/// - **运行期行为**：对每个请求分类并发出恰好一条注解，然后无条件委派，
///   响应与失败原样返回；
/// - **装配期行为**：[`wrap`](StackModule::wrap) 从叠加层读取 [`TraceSinkParam`]，
///   把任意下游端点工厂包裹为带追踪行为的新工厂。
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingModule;

impl TracingModule {
    /// 追踪模块的固定角色名。
    pub const ROLE: &'static str = "protocol.tracing";

    /// 返回追踪模块的角色标识。
    pub fn role() -> Role {
        Role::from_static(Self::ROLE)
    }
}

impl<Req, Rsp> StackModule<Req, Rsp> for TracingModule
where
    Req: ClassifyRequest + Send + 'static,
    Rsp: Send + 'static,
{
    fn role(&self) -> Role {
        Self::role()
    }

    fn description(&self) -> Cow<'static, str> {
        Cow::Borrowed("按请求变体发出追踪注解，随后无条件委派给下游端点")
    }

    fn wrap(
        &self,
        inner: ArcEndpointFactory<Req, Rsp>,
        params: &StackParams,
    ) -> ArcEndpointFactory<Req, Rsp> {
        let TraceSinkParam(sink) = params.get::<TraceSinkParam>();
        Arc::new(TracedFactory { inner, sink })
    }
}

/// 由请求值派生一条追踪注解。
///
/// # 契约说明
/// - 文本型操作（查询/准备）：键取 [`QUERY_ANNOTATION_KEY`]/[`PREPARE_ANNOTATION_KEY`]，
///   值为语句字面量；
/// - 预编译执行：键取 [`EXECUTE_ANNOTATION_KEY`]，值为语句标识的大端序字节；
/// - 未归类请求：键退化为请求类型名，值为空文本。
fn annotation_for<Req: ClassifyRequest>(request: &Req) -> TraceAnnotation {
    match request.variant() {
        RequestVariant::Query(text) => {
            TraceAnnotation::text(QUERY_ANNOTATION_KEY, String::from(text))
        }
        RequestVariant::Prepare(text) => {
            TraceAnnotation::text(PREPARE_ANNOTATION_KEY, String::from(text))
        }
        RequestVariant::ExecutePrepared(statement_id) => {
            TraceAnnotation::binary(EXECUTE_ANNOTATION_KEY, statement_id.to_be_bytes().to_vec())
        }
        RequestVariant::Other => TraceAnnotation::text(core::any::type_name::<Req>(), ""),
    }
}

struct TracedFactory<Req, Rsp>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    inner: ArcEndpointFactory<Req, Rsp>,
    sink: Arc<dyn TraceSink>,
}

#[async_trait]
impl<Req, Rsp> EndpointFactory<Req, Rsp> for TracedFactory<Req, Rsp>
where
    Req: ClassifyRequest + Send + 'static,
    Rsp: Send + 'static,
{
    async fn make(&self) -> crate::Result<ArcEndpoint<Req, Rsp>> {
        let endpoint = self.inner.make().await?;
        Ok(Arc::new(TracedEndpoint {
            inner: endpoint,
            sink: self.sink.clone(),
        }))
    }
}

struct TracedEndpoint<Req, Rsp>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    inner: ArcEndpoint<Req, Rsp>,
    sink: Arc<dyn TraceSink>,
}

#[async_trait]
impl<Req, Rsp> Endpoint<Req, Rsp> for TracedEndpoint<Req, Rsp>
where
    Req: ClassifyRequest + Send + 'static,
    Rsp: Send + 'static,
{
    async fn call(&self, request: Req) -> crate::Result<Rsp> {
        // 注解先于委派同步发出；采集器契约保证该调用非阻塞且不失败。
        self.sink.record(annotation_for(&request));
        self.inner.call(request).await
    }
}
