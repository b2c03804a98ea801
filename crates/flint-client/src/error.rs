use alloc::{borrow::Cow, boxed::Box};
use core::fmt;

/// 装配核心自身不产生可恢复错误；本类型服务于协作方接缝。
///
/// # 设计背景（Why）
/// - 解析器、传输构造器与派发器都在 `materialize` 链路上向调用方返回失败，
///   需要一个跨层稳定的错误载体，使日志与告警系统可以按错误码做自动化归类。
/// - 框架定位于 `no_std + alloc`，因此不绑定 `std::error::Error`，而是依赖
///   `core::error::Error` 提供根因链路。
///
/// # 逻辑解析（How）
/// - 错误码 `code` 始终为 `'static` 字符串，承载稳定语义，推荐取值见 [`codes`]；
/// - `message` 面向排障人员，可为静态或堆分配字符串；
/// - `cause` 以 Builder 风格（[`with_cause`](Self::with_cause)）叠加底层原因，
///   并通过 `source()` 暴露完整链路。
///
/// # 契约说明（What）
/// - **前置条件**：调用方应使用 [`codes`] 模块或遵循 `<域>.<语义>` 约定的自定义码值；
/// - **后置条件**：返回值拥有独立所有权，可跨线程移动（`Send + Sync + 'static`）；
/// - 栈折叠之后发生的失败（连接中断、鉴权拒绝、协议错误）属于终端端点的契约，
///   装配核心只负责原样透传，绝不吞没或改写。
///
/// # 设计取舍（Trade-offs）
/// - 使用 `String`/`Cow` 保存消息，牺牲极少量堆分配换取跨语言桥接时的灵活性。
#[derive(Debug)]
pub struct ClientError {
    code: &'static str,
    message: Cow<'static, str>,
    cause: Option<Box<dyn core::error::Error + Send + Sync>>,
}

impl ClientError {
    /// 构造新的客户端错误。
    ///
    /// # 契约说明
    /// - **输入参数**：
    ///   - `code`：遵循 `<域>.<语义>` 约定的稳定错误码；
    ///   - `message`：面向排障人员的自然语言描述，不应包含敏感信息。
    /// - **后置条件**：`cause` 初始为空，可稍后通过 [`with_cause`](Self::with_cause) 填充。
    pub fn new(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// 附带底层原因并返回新的错误。
    pub fn with_cause(mut self, cause: impl core::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// 获取稳定错误码。
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// 获取人类可读的错误描述。
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 访问底层原因（若存在）。
    pub fn cause(&self) -> Option<&(dyn core::error::Error + Send + Sync)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl core::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn core::error::Error + 'static))
    }
}

/// 装配核心保留的稳定错误码集合。
///
/// # 命名约定
/// - 全部采用 `client.<语义>` 形式；协作方扩展自定义码值时应使用各自的域前缀，
///   避免与此处的保留码冲突。
pub mod codes {
    /// 逻辑目的地解析失败（`Resolve::resolve` 返回错误时的推荐码值）。
    pub const RESOLVE_FAILED: &str = "client.resolve_failed";
    /// 传输构造失败（无法建立到已解析目标的传输通道）。
    pub const TRANSPORT_UNAVAILABLE: &str = "client.transport_unavailable";
    /// 派发器拒绝装配请求/响应端点。
    pub const DISPATCH_REJECTED: &str = "client.dispatch_rejected";
    /// 终端端点在请求处理过程中报告的协议级失败。
    pub const PROTOCOL_FAILURE: &str = "client.protocol_failure";
}

/// 贯穿整个 crate 的结果别名，默认错误类型为 [`ClientError`]。
pub type Result<T, E = ClientError> = core::result::Result<T, E>;
