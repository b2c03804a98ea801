//! 模块栈折叠与客户端配置装配的端到端验证。
//!
//! # 教案级注释概览
//! - **核心目标 (Why)**：折叠顺序确定性（首个模块在最外层）、插入操作的纯函数语义、
//!   构建器链的不可变性，以及物化接缝（解析器/传输构造器/派发器）的穿线正确性，
//!   共同构成装配核心对外承诺的全部可观察行为。
//! - **手法 (How)**：用最小打标模块（把自身标签包裹在响应外层）使折叠顺序在响应
//!   字符串中可见；用桩协作方驱动 `materialize`，以 `futures::executor::block_on`
//!   驱动异步契约。

use std::sync::Arc;

use flint_client::{
    ArcEndpoint, ArcEndpointFactory, ClassifyRequest, ClientConfiguration, Database, Dispatcher,
    Endpoint, EndpointFactory, Resolve, ResolvedTarget, RequestVariant, Role, Stack, StackModule,
    StackParams, Transporter, TracingModule,
    error::{ClientError, codes},
    Charset, Credentials,
};

use async_trait::async_trait;
use futures::executor::block_on;
use std::borrow::Cow;

/// 测试请求：最小的可分类协议操作。
#[derive(Debug)]
struct TestRequest(String);

impl ClassifyRequest for TestRequest {
    fn variant(&self) -> RequestVariant<'_> {
        RequestVariant::Query(&self.0)
    }
}

/// 终端端点：返回固定标记 `T`。
struct TerminalEndpoint;

#[async_trait]
impl Endpoint<TestRequest, String> for TerminalEndpoint {
    async fn call(&self, _request: TestRequest) -> flint_client::Result<String> {
        Ok(String::from("T"))
    }
}

struct TerminalStub;

#[async_trait]
impl EndpointFactory<TestRequest, String> for TerminalStub {
    async fn make(&self) -> flint_client::Result<ArcEndpoint<TestRequest, String>> {
        Ok(Arc::new(TerminalEndpoint))
    }
}

/// 打标模块：把自身标签包裹在下游响应外层，让折叠顺序在响应中可见。
struct LabelModule {
    role: Role,
    tag: &'static str,
}

impl LabelModule {
    fn new(role: &'static str, tag: &'static str) -> Arc<Self> {
        Arc::new(Self {
            role: Role::from_static(role),
            tag,
        })
    }
}

impl StackModule<TestRequest, String> for LabelModule {
    fn role(&self) -> Role {
        self.role.clone()
    }

    fn description(&self) -> Cow<'static, str> {
        Cow::Borrowed("test label module")
    }

    fn wrap(
        &self,
        inner: ArcEndpointFactory<TestRequest, String>,
        _params: &StackParams,
    ) -> ArcEndpointFactory<TestRequest, String> {
        Arc::new(LabelFactory {
            inner,
            tag: self.tag,
        })
    }
}

struct LabelFactory {
    inner: ArcEndpointFactory<TestRequest, String>,
    tag: &'static str,
}

#[async_trait]
impl EndpointFactory<TestRequest, String> for LabelFactory {
    async fn make(&self) -> flint_client::Result<ArcEndpoint<TestRequest, String>> {
        let endpoint = self.inner.make().await?;
        Ok(Arc::new(LabelEndpoint {
            inner: endpoint,
            tag: self.tag,
        }))
    }
}

struct LabelEndpoint {
    inner: ArcEndpoint<TestRequest, String>,
    tag: &'static str,
}

#[async_trait]
impl Endpoint<TestRequest, String> for LabelEndpoint {
    async fn call(&self, request: TestRequest) -> flint_client::Result<String> {
        let response = self.inner.call(request).await?;
        Ok(format!("{}({})", self.tag, response))
    }
}

fn role_names(stack: &Stack<TestRequest, String>) -> Vec<String> {
    stack
        .roles()
        .into_iter()
        .map(|role| String::from(role.name()))
        .collect()
}

/// 折叠顺序确定性：`fold([A, B], T) == A.wrap(B.wrap(T))`，A 的行为位于最外层。
#[test]
fn fold_applies_first_module_outermost() {
    let stack = Stack::new()
        .push_back(LabelModule::new("test.a", "A"))
        .push_back(LabelModule::new("test.b", "B"));
    let factory = stack.fold(Arc::new(TerminalStub), &StackParams::new());
    let endpoint = block_on(factory.make()).expect("terminal stub never fails");
    let response = block_on(endpoint.call(TestRequest(String::from("ping")))).unwrap();
    assert_eq!(response, "A(B(T))");
}

/// 空栈折叠恒等于终端工厂。
#[test]
fn empty_stack_fold_is_identity() {
    let stack: Stack<TestRequest, String> = Stack::new();
    let factory = stack.fold(Arc::new(TerminalStub), &StackParams::new());
    let endpoint = block_on(factory.make()).unwrap();
    let response = block_on(endpoint.call(TestRequest(String::from("ping")))).unwrap();
    assert_eq!(response, "T");
}

/// 按角色插入：`insert_before`/`insert_after` 以首个匹配为准，产出新栈、原栈不变。
#[test]
fn insertion_is_pure_and_positional() {
    let base = Stack::new()
        .push_back(LabelModule::new("test.a", "A"))
        .push_back(LabelModule::new("test.c", "C"));

    let before = base.insert_before(&Role::from_static("test.c"), LabelModule::new("test.b", "B"));
    assert_eq!(role_names(&before), ["test.a", "test.b", "test.c"]);

    let after = base.insert_after(&Role::from_static("test.a"), LabelModule::new("test.b", "B"));
    assert_eq!(role_names(&after), ["test.a", "test.b", "test.c"]);

    let front = base.push_front(LabelModule::new("test.z", "Z"));
    assert_eq!(role_names(&front), ["test.z", "test.a", "test.c"]);

    // 原栈不受任何插入影响。
    assert_eq!(role_names(&base), ["test.a", "test.c"]);
}

/// 角色缺失时按角色插入不改变栈（不隐式追加）。
#[test]
fn insertion_with_missing_role_leaves_stack_unchanged() {
    let base = Stack::new().push_back(LabelModule::new("test.a", "A"));
    let unchanged =
        base.insert_before(&Role::from_static("test.missing"), LabelModule::new("test.b", "B"));
    assert_eq!(role_names(&unchanged), ["test.a"]);
}

/// 重复角色允许共存（插入时不校验唯一性），定位以首个匹配为准。
#[test]
fn duplicate_roles_coexist() {
    let stack = Stack::new()
        .push_back(LabelModule::new("test.dup", "A"))
        .push_back(LabelModule::new("test.dup", "B"))
        .insert_after(&Role::from_static("test.dup"), LabelModule::new("test.mid", "M"));
    assert_eq!(role_names(&stack), ["test.dup", "test.mid", "test.dup"]);
}

/// 规范缺省配置：空叠加层，栈内恰好一个追踪模块。
#[test]
fn default_configuration_carries_tracing_module() {
    let config: ClientConfiguration<TestRequest, String> = ClientConfiguration::new();
    assert!(config.params().is_empty());
    assert_eq!(config.stack().len(), 1);
    assert!(config.stack().contains(&TracingModule::role()));
}

/// 构建器不可变性：派生配置不回写接收者。
#[test]
fn builder_methods_do_not_mutate_receiver() {
    let base: ClientConfiguration<TestRequest, String> = ClientConfiguration::new();
    let derived = base.with_database("orders");

    assert_eq!(derived.params().get::<Database>(), Database(Some(String::from("orders"))));
    assert_eq!(base.params().get::<Database>(), Database(None));
    assert!(base.params().is_empty());
}

/// 链式定制可组合且与调用顺序无关（按键观察）。
#[test]
fn chained_builders_compose_order_independently() {
    let base: ClientConfiguration<TestRequest, String> = ClientConfiguration::new();

    let ab = base.with_credentials("u", "p").with_database("d");
    let ba = base.with_database("d").with_credentials("u", "p");

    for config in [&ab, &ba] {
        assert_eq!(
            config.params().get::<Credentials>(),
            Credentials {
                username: Some(String::from("u")),
                password: Some(String::from("p")),
            }
        );
        assert_eq!(config.params().get::<Database>(), Database(Some(String::from("d"))));
    }
}

/// `with_stack` 替换模块栈、共享叠加层，接收者原样保留缺省栈。
#[test]
fn with_stack_swaps_stack_and_shares_params() {
    let base: ClientConfiguration<TestRequest, String> =
        ClientConfiguration::new().with_database("orders");
    let swapped = base.with_stack(Stack::new().push_back(LabelModule::new("test.only", "O")));

    assert_eq!(role_names(swapped.stack()), ["test.only"]);
    assert_eq!(swapped.params().get::<Database>(), Database(Some(String::from("orders"))));

    assert!(base.stack().contains(&TracingModule::role()));
    assert!(!base.stack().contains(&Role::from_static("test.only")));
}

/// `with_charset` 把字符集编码写入叠加层，接收者保持缺省值。
#[test]
fn with_charset_lands_in_overlay() {
    let base: ClientConfiguration<TestRequest, String> = ClientConfiguration::new();
    let derived = base.with_charset(45);

    assert_eq!(derived.params().get::<Charset>(), Charset(45));
    assert_eq!(base.params().get::<Charset>(), Charset::UTF8);
}

/// 同值重复 `configured` 与单次应用观察等价。
#[test]
fn configured_is_idempotent() {
    let base: ClientConfiguration<TestRequest, String> = ClientConfiguration::new();
    let once = base.configured(Charset(45));
    let twice = once.configured(Charset(45));
    assert_eq!(once.params().get::<Charset>(), twice.params().get::<Charset>());
    assert_eq!(once.params().len(), twice.params().len());
    assert_eq!(once.stack().len(), twice.stack().len());
}

// ---- 物化接缝桩 ----

/// 静态解析器：记录入参并返回固定目标。
struct StaticResolver;

impl Resolve for StaticResolver {
    fn resolve(&self, destination: &str, label: &str) -> flint_client::Result<ResolvedTarget> {
        if destination.is_empty() {
            return Err(ClientError::new(codes::RESOLVE_FAILED, "empty destination"));
        }
        Ok(ResolvedTarget {
            authority: Cow::Owned(String::from(destination)),
            label: Cow::Owned(String::from(label)),
        })
    }
}

/// 桩传输构造器：通道句柄即目标地址字符串。
struct StubTransporter;

#[async_trait]
impl Transporter for StubTransporter {
    type Transport = String;

    async fn transport(
        &self,
        target: &ResolvedTarget,
        _params: &StackParams,
    ) -> flint_client::Result<String> {
        Ok(String::from(target.authority.as_ref()))
    }
}

/// 桩派发器：端点回显「通道句柄 + 会话库名 + 请求文本」，验证叠加层穿线。
struct StubDispatcher;

impl Dispatcher<TestRequest, String> for StubDispatcher {
    type Transport = String;

    fn dispatch(
        &self,
        transport: String,
        session: &StackParams,
    ) -> ArcEndpoint<TestRequest, String> {
        let database = session.get::<Database>().0.unwrap_or_default();
        Arc::new(DispatchedEndpoint {
            transport,
            database,
        })
    }
}

struct DispatchedEndpoint {
    transport: String,
    database: String,
}

#[async_trait]
impl Endpoint<TestRequest, String> for DispatchedEndpoint {
    async fn call(&self, request: TestRequest) -> flint_client::Result<String> {
        Ok(format!("{}/{}:{}", self.transport, self.database, request.0))
    }
}

/// 物化把解析结果与完整叠加层穿线到终端工厂，栈模块包裹在外层。
#[test]
fn materialize_threads_params_through_terminal_factory() {
    let config: ClientConfiguration<TestRequest, String> =
        ClientConfiguration::new().with_database("orders");

    let endpoint = block_on(config.materialize_endpoint(
        "db.example:3306",
        "primary",
        &StaticResolver,
        Arc::new(StubTransporter),
        Arc::new(StubDispatcher),
    ))
    .expect("stub collaborators never fail");

    let response = block_on(endpoint.call(TestRequest(String::from("SELECT 1")))).unwrap();
    assert_eq!(response, "db.example:3306/orders:SELECT 1");
}

/// 解析失败在物化时原样返回，折叠不会发生。
#[test]
fn materialize_surfaces_resolution_failure() {
    let config: ClientConfiguration<TestRequest, String> = ClientConfiguration::new();
    let error = config
        .materialize(
            "",
            "primary",
            &StaticResolver,
            Arc::new(StubTransporter),
            Arc::new(StubDispatcher),
        )
        .err()
        .expect("empty destination must fail resolution");
    assert_eq!(error.code(), codes::RESOLVE_FAILED);
}

/// 物化不消耗配置：同一配置可重复物化，彼此独立。
#[test]
fn configuration_survives_materialization() {
    let config: ClientConfiguration<TestRequest, String> =
        ClientConfiguration::new().with_database("orders");

    for _ in 0..2 {
        let factory = config
            .materialize(
                "db.example:3306",
                "primary",
                &StaticResolver,
                Arc::new(StubTransporter),
                Arc::new(StubDispatcher),
            )
            .unwrap();
        let endpoint = block_on(factory.make()).unwrap();
        let response = block_on(endpoint.call(TestRequest(String::from("x")))).unwrap();
        assert_eq!(response, "db.example:3306/orders:x");
    }
    assert_eq!(config.params().get::<Database>(), Database(Some(String::from("orders"))));
}
