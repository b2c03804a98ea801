//! 模块栈：以有序、可组合的方式把中间件包裹在终端端点工厂之外。
//!
//! # 教案式概览
//! - **意图（Why）**：协议无关的行为（追踪、池化策略提示）应当以"装饰器流水线"
//!   层叠在通用客户端之上，而不是通过继承或修改传输/派发代码实现。模块栈把
//!   "连接外面包什么"（通用）与"连接怎么建立、请求怎么派发"（协议特定、外部黑盒）
//!   彻底解耦。
//! - **结构（How）**：[`Stack`] 是 `Arc<dyn StackModule>` 的有序序列，最外层在前；
//!   [`Stack::fold`] 自内向外依次应用每个模块的 [`wrap`](StackModule::wrap)，
//!   终止于外部提供的终端工厂。插入操作全部为纯函数，产出新栈、原栈不受影响。
//! - **契约（What)**：折叠顺序确定且等于序列顺序；模块转换假定为全函数，所需配置
//!   从折叠时传入的 [`StackParams`] 读取（按叠加层契约必然可解析）。
//! - **风险提示（Trade-offs）**：角色唯一性在插入时**不做**校验——重复角色共存，
//!   按角色定位的插入以首个匹配为准；调用方须按约定保证角色全局唯一。
//!   模块之间不保证副作用可交换，顺序由调用方全权掌控。

use alloc::{borrow::Cow, string::String, sync::Arc, vec::Vec};
use core::fmt;

use crate::endpoint::ArcEndpointFactory;
use crate::params::StackParams;

/// 模块在栈内的符号化角色标识。
///
/// # 契约说明（What）
/// - 角色是按约定全局唯一的稳定名字，推荐 `vendor.component` 命名（如 `protocol.tracing`）；
/// - 栈本身不强制唯一性（见模块级文档），按角色定位时以首个匹配为准。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// 以静态字符串构造角色，零分配。
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// 以任意字符串构造角色。
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// 获取角色名。
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 栈模块合约：一个具名、可自描述的端点工厂变换。
///
/// # 设计背景（Why）
/// - 综合 Express Middleware、Tower Layer 与 Finagle Stack 的经验：中间件表达为
///   "工厂到工厂"的纯包裹函数，任何横切行为（观测、池化提示）都能以统一形态层叠。
///
/// # 契约说明（What）
/// - [`role`](Self::role)：返回模块的稳定角色标识，供按角色插入时定位；
/// - [`description`](Self::description)：面向运维与链路图谱的人类可读描述；
/// - [`wrap`](Self::wrap)：接收下游端点工厂与折叠时的配置叠加层，返回新工厂。
///   变换必须是全函数——所需配置一律从 `params` 读取，按叠加层契约永远可解析。
///
/// # 风险提示（Trade-offs）
/// - `wrap` 不应执行阻塞或失败的初始化；需要 I/O 的准备工作应推迟到工厂的
///   `make` 阶段，保持折叠本身纯粹、可重复。
pub trait StackModule<Req, Rsp>: Send + Sync + 'static
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    /// 返回模块的角色标识。
    fn role(&self) -> Role;

    /// 返回模块的人类可读描述。
    fn description(&self) -> Cow<'static, str>;

    /// 用本模块的行为包裹下游端点工厂。
    fn wrap(
        &self,
        inner: ArcEndpointFactory<Req, Rsp>,
        params: &StackParams,
    ) -> ArcEndpointFactory<Req, Rsp>;
}

/// 有序的模块序列，最外层在前。
///
/// # 契约速览
/// - **不可变**：全部插入操作产出新栈，原栈可继续被其他持有者使用；
/// - **折叠确定性**：`fold([A, B], T) == A.wrap(B.wrap(T))`，A 包在最外层；
/// - **并发**：栈是纯值，可跨线程自由共享。
pub struct Stack<Req, Rsp>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    modules: Vec<Arc<dyn StackModule<Req, Rsp>>>,
}

impl<Req, Rsp> Stack<Req, Rsp>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    /// 构造空栈。
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// 返回在最前（最外层）追加模块后的新栈。
    pub fn push_front(&self, module: Arc<dyn StackModule<Req, Rsp>>) -> Self {
        let mut modules = Vec::with_capacity(self.modules.len() + 1);
        modules.push(module);
        modules.extend(self.modules.iter().cloned());
        Self { modules }
    }

    /// 返回在最后（最内层）追加模块后的新栈。
    pub fn push_back(&self, module: Arc<dyn StackModule<Req, Rsp>>) -> Self {
        let mut modules = self.modules.clone();
        modules.push(module);
        Self { modules }
    }

    /// 返回把 `module` 插到首个角色为 `role` 的模块之前（更外层）的新栈。
    ///
    /// # 契约说明
    /// - 以首个匹配为准；若 `role` 不存在，返回与原栈观察等价的副本（不隐式追加）。
    pub fn insert_before(&self, role: &Role, module: Arc<dyn StackModule<Req, Rsp>>) -> Self {
        match self.position(role) {
            Some(index) => self.insert_at(index, module),
            None => self.clone(),
        }
    }

    /// 返回把 `module` 插到首个角色为 `role` 的模块之后（更内层）的新栈。
    ///
    /// # 契约说明
    /// - 以首个匹配为准；若 `role` 不存在，返回与原栈观察等价的副本。
    pub fn insert_after(&self, role: &Role, module: Arc<dyn StackModule<Req, Rsp>>) -> Self {
        match self.position(role) {
            Some(index) => self.insert_at(index + 1, module),
            None => self.clone(),
        }
    }

    /// 判断栈中是否存在角色为 `role` 的模块。
    pub fn contains(&self, role: &Role) -> bool {
        self.position(role).is_some()
    }

    /// 自外向内列出全部模块角色。
    pub fn roles(&self) -> Vec<Role> {
        self.modules.iter().map(|module| module.role()).collect()
    }

    /// 模块数量。
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// 栈是否为空。
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// 把整个栈折叠到终端工厂上，产出装配完成的端点工厂。
    ///
    /// # 契约说明（What）
    /// - **顺序**：自内向外依次应用模块变换，序列首个模块的行为位于最外层；
    /// - **配置**：`params` 原样传递给每个模块的 [`wrap`](StackModule::wrap)，
    ///   模块按需读取（叠加层保证任何键都可解析）；
    /// - **纯粹性**：折叠本身无副作用、不可失败；预期每个逻辑客户端装配一次，
    ///   产物才是被请求流量并发使用的对象。
    pub fn fold(
        &self,
        terminal: ArcEndpointFactory<Req, Rsp>,
        params: &StackParams,
    ) -> ArcEndpointFactory<Req, Rsp> {
        self.modules
            .iter()
            .rev()
            .fold(terminal, |inner, module| module.wrap(inner, params))
    }

    fn position(&self, role: &Role) -> Option<usize> {
        self.modules.iter().position(|module| module.role() == *role)
    }

    fn insert_at(&self, index: usize, module: Arc<dyn StackModule<Req, Rsp>>) -> Self {
        let mut modules = self.modules.clone();
        modules.insert(index, module);
        Self { modules }
    }
}

impl<Req, Rsp> Default for Stack<Req, Rsp>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

// 手写 Clone：派生实现会对 Req/Rsp 追加不必要的 `Clone` 约束。
impl<Req, Rsp> Clone for Stack<Req, Rsp>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            modules: self.modules.clone(),
        }
    }
}

impl<Req, Rsp> fmt::Debug for Stack<Req, Rsp>
where
    Req: Send + 'static,
    Rsp: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roles: Vec<String> = self
            .modules
            .iter()
            .map(|module| String::from(module.role().name()))
            .collect();
        f.debug_struct("Stack").field("roles", &roles).finish()
    }
}
