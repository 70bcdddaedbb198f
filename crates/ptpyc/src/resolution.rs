//! Lexical scope resolution.
//!
//! Resolution runs in two phases over a parsed [Module]. The first phase walks the tree top
//! down, giving the module and every [ClosureBlock] its own [Scope] and recording which
//! names each scope binds and reads. The second phase visits scopes bottom up and gives
//! every recorded name exactly one [NameClass].

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use ptpy_ast::stmt::{AugAssignStmt, ClosureBlock, ExecStmt, ForStmt, Stmt, StmtKind, Target};
use ptpy_ast::visitor::{walk_expr_mut, walk_module_mut, walk_stmt_mut, AstVisitorMut};
use ptpy_ast::{AssignStmt, Expr, ExprKind, Module, ScopeId, Span};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Index;
use strum::AsRefStr;
use tracing::{debug, trace, warn};

/// How a name is stored by the scope that refers to it
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NameClass {
    /// Bound in this scope and never captured
    Local,
    /// Lives in the module namespace
    Global,
    /// Bound in an enclosing scope and captured by reference
    Free,
    /// Bound in this scope and captured by at least one nested scope
    Cell,
}

impl Display for NameClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// The bindings of a single module or closure block
#[derive(Debug, Clone)]
pub struct Scope {
    id: ScopeId,
    name: String,
    is_nested: bool,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    locals: IndexSet<String>,
    globals_declared: IndexSet<String>,
    uses: IndexSet<String>,
    frees: IndexSet<String>,
    cells: IndexSet<String>,
    classes: IndexMap<String, NameClass>,
    use_sites: HashMap<String, Span>,
}

impl Scope {
    fn new(id: ScopeId, name: impl Into<String>, parent: Option<ScopeId>) -> Self {
        Self {
            id,
            name: name.into(),
            is_nested: parent.is_some(),
            parent,
            children: vec![],
            locals: Default::default(),
            globals_declared: Default::default(),
            uses: Default::default(),
            frees: Default::default(),
            cells: Default::default(),
            classes: Default::default(),
            use_sites: Default::default(),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// The name of the closure block owning this scope, or `<module>`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this scope belongs to a closure block. The module scope never is.
    pub fn is_nested(&self) -> bool {
        self.is_nested
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Child scopes, in source order
    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    /// Names bound in this scope, in binding order
    pub fn locals(&self) -> &IndexSet<String> {
        &self.locals
    }

    pub fn globals_declared(&self) -> &IndexSet<String> {
        &self.globals_declared
    }

    pub fn uses(&self) -> &IndexSet<String> {
        &self.uses
    }

    pub fn frees(&self) -> &IndexSet<String> {
        &self.frees
    }

    pub fn cells(&self) -> &IndexSet<String> {
        &self.cells
    }

    /// Gets the classification of a name referred to in this scope
    pub fn classify(&self, name: &str) -> Option<NameClass> {
        self.classes.get(name).copied()
    }

    /// Every classified name of this scope
    pub fn classifications(&self) -> impl Iterator<Item = (&str, NameClass)> {
        self.classes.iter().map(|(name, class)| (name.as_str(), *class))
    }

    /// Where a name was first read in this scope
    pub fn use_site(&self, name: &str) -> Option<Span> {
        self.use_sites.get(name).copied()
    }

    fn add_use(&mut self, name: &str, span: Span) {
        self.uses.insert(name.to_string());
        self.use_sites.entry(name.to_string()).or_insert(span);
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.name,
            self.id,
            self.classes
                .iter()
                .map(|(name, class)| format!("{name}={class}"))
                .join(", ")
        )
    }
}

/// Arena of every scope created for one module. The module scope is always first.
#[derive(Debug, Clone, Default)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
}

impl ScopeTable {
    /// Gets a scope by id
    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0)
    }

    /// The module scope
    pub fn root(&self) -> Option<&Scope> {
        self.scopes.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    fn create(&mut self, name: impl Into<String>, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(id, name, parent));
        if let Some(parent) = parent {
            self.scopes[parent.0].children.push(id);
        }
        id
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0]
    }
}

impl Index<ScopeId> for ScopeTable {
    type Output = Scope;

    fn index(&self, index: ScopeId) -> &Self::Output {
        &self.scopes[index.0]
    }
}

/// A name that only resolved through the module level fallback, without being bound
/// anywhere in the module or registered as a builtin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnboundGlobal {
    /// The scope the name was read in
    pub scope: ScopeId,
    pub name: String,
}

/// A module with every scope resolved
#[derive(Debug)]
pub struct ResolvedModule {
    module: Module,
    scopes: ScopeTable,
    unbound: Vec<UnboundGlobal>,
}

impl ResolvedModule {
    /// The annotated syntax tree
    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn scopes(&self) -> &ScopeTable {
        &self.scopes
    }

    /// The scope of the module itself
    pub fn scope_of_module(&self) -> &Scope {
        &self.scopes[self.module.scope.unwrap_or(ScopeId(0))]
    }

    /// The scope of a closure block of this module
    pub fn scope_of(&self, closure_block: &ClosureBlock) -> Option<&Scope> {
        closure_block.scope.and_then(|id| self.scopes.get(id))
    }

    /// Names that fell through to the permissive global default
    pub fn unbound_globals(&self) -> &[UnboundGlobal] {
        &self.unbound
    }

    pub fn into_parts(self) -> (Module, ScopeTable) {
        (self.module, self.scopes)
    }
}

/// Resolves the scopes of modules
#[derive(Debug, Default, Clone)]
pub struct Resolver {
    builtins: IndexSet<String>,
}

impl Resolver {
    /// Creates a resolver that knows of no builtin names
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver that treats the given names as provided by the runtime
    pub fn with_builtins<I, S>(builtins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            builtins: builtins.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolves every scope of a module, annotating the module and its closure blocks with
    /// their scope ids.
    pub fn resolve(&self, mut module: Module) -> ResolvedModule {
        let mut collector = ScopeCollector::default();
        if let Err(never) = collector.visit_module_mut(&mut module) {
            match never {}
        }
        let mut classifier = Classifier {
            bound_globals: bound_globals(&collector.table),
            builtins: &self.builtins,
            table: collector.table,
            unbound: vec![],
        };
        classifier.classify_all();
        ResolvedModule {
            module,
            scopes: classifier.table,
            unbound: classifier.unbound,
        }
    }
}

/// Names bound in the module namespace, either at module level or through a `global`
/// declaration in a closure block
fn bound_globals(table: &ScopeTable) -> IndexSet<String> {
    let mut bound = IndexSet::new();
    for scope in table.iter() {
        if scope.is_nested {
            bound.extend(scope.locals.intersection(&scope.globals_declared).cloned());
        } else {
            bound.extend(scope.locals.iter().cloned());
        }
    }
    bound
}

/// First phase, creates scopes and records bindings and uses
#[derive(Debug, Default)]
struct ScopeCollector {
    table: ScopeTable,
    current: Option<ScopeId>,
}

impl ScopeCollector {
    fn scope(&mut self) -> &mut Scope {
        let id = self.current.unwrap_or(ScopeId(0));
        self.table.scope_mut(id)
    }

    fn bind(&mut self, name: &str) {
        self.scope().locals.insert(name.to_string());
    }

    fn with_scope<F>(&mut self, name: &str, f: F) -> ScopeId
    where
        F: FnOnce(&mut Self),
    {
        let id = self.table.create(name, self.current);
        debug!("created scope {id} for {name}");
        let parent = self.current.replace(id);
        f(self);
        self.current = parent;
        id
    }
}

impl AstVisitorMut for ScopeCollector {
    type Err = Infallible;

    fn visit_module_mut(&mut self, module: &mut Module) -> Result<(), Self::Err> {
        let mut result = Ok(());
        let id = self.with_scope("<module>", |collector| {
            result = walk_module_mut(collector, module);
        });
        module.scope = Some(id);
        result
    }

    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) -> Result<(), Self::Err> {
        match &stmt.kind {
            StmtKind::Assign(AssignStmt {
                target: Target::Name(name),
                ..
            }) => self.bind(name),
            StmtKind::AugAssign(AugAssignStmt {
                target: Target::Name(name),
                ..
            }) => {
                self.bind(name);
                self.scope().add_use(name, stmt.span);
            }
            StmtKind::For(ForStmt { target, .. }) => self.bind(target),
            StmtKind::Global(names) => {
                let scope = self.scope();
                scope.globals_declared.extend(names.iter().cloned());
            }
            StmtKind::Exec(ExecStmt { code, .. }) => self.scope().add_use(code, stmt.span),
            _ => {}
        }
        walk_stmt_mut(self, stmt)
    }

    fn visit_closure_block_mut(&mut self, closure_block: &mut ClosureBlock) -> Result<(), Self::Err> {
        self.bind(&closure_block.name);
        if let Some(wrapper) = &mut closure_block.wrapper {
            self.scope().add_use(&closure_block.name, closure_block.span);
            self.visit_expr_mut(wrapper)?;
        }
        let mut result = Ok(());
        let name = closure_block.name.clone();
        let id = self.with_scope(&name, |collector| {
            result = collector.visit_block_mut(&mut closure_block.body);
        });
        closure_block.scope = Some(id);
        result
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) -> Result<(), Self::Err> {
        if let ExprKind::Name(name) = &expr.kind {
            trace!("{name} read at {}:{}", expr.span.line(), expr.span.column());
            self.scope().add_use(name, expr.span);
        }
        walk_expr_mut(self, expr)
    }
}

/// Second phase, classifies names from the innermost scopes outwards
struct Classifier<'a> {
    table: ScopeTable,
    bound_globals: IndexSet<String>,
    builtins: &'a IndexSet<String>,
    unbound: Vec<UnboundGlobal>,
}

impl Classifier<'_> {
    fn classify_all(&mut self) {
        // scopes are created parent first, so reverse order visits children first
        for index in (0..self.table.len()).rev() {
            let id = ScopeId(index);
            let scope = &self.table[id];
            let names = scope
                .uses
                .iter()
                .chain(&scope.globals_declared)
                .chain(&scope.locals)
                .cloned()
                .collect::<Vec<_>>();
            for name in names {
                self.resolve(id, &name, id, false);
            }
        }
    }

    /// Resolves `name` in scope `id`. `reported` is set when a nested scope is asking for
    /// a name it could not resolve itself, and `origin` is the scope that first read it.
    fn resolve(&mut self, id: ScopeId, name: &str, origin: ScopeId, reported: bool) -> NameClass {
        let scope = self.table.scope_mut(id);
        match scope.classes.get(name) {
            Some(NameClass::Local) if reported => {
                scope.cells.insert(name.to_string());
                return self.record(id, name, NameClass::Cell);
            }
            Some(class) => return *class,
            None => {}
        }

        let class = if scope.globals_declared.contains(name) {
            NameClass::Global
        } else if scope.cells.contains(name) {
            NameClass::Cell
        } else if scope.locals.contains(name) {
            if reported {
                scope.cells.insert(name.to_string());
                NameClass::Cell
            } else {
                NameClass::Local
            }
        } else if let (true, Some(parent)) = (scope.is_nested, scope.parent) {
            scope.frees.insert(name.to_string());
            // recorded before asking the parent so siblings reporting the same name agree
            self.record(id, name, NameClass::Free);
            match self.resolve(parent, name, origin, true) {
                NameClass::Global => {
                    self.table.scope_mut(id).frees.shift_remove(name);
                    NameClass::Global
                }
                _ => NameClass::Free,
            }
        } else {
            self.default_to_global(name, origin);
            NameClass::Global
        };
        self.record(id, name, class)
    }

    fn default_to_global(&mut self, name: &str, origin: ScopeId) {
        if self.bound_globals.contains(name) || self.builtins.contains(name) {
            return;
        }
        warn!(
            "{name:?} read in {} is not bound anywhere, treating it as global",
            self.table[origin].name
        );
        self.unbound.push(UnboundGlobal {
            scope: origin,
            name: name.to_string(),
        });
    }

    fn record(&mut self, id: ScopeId, name: &str, class: NameClass) -> NameClass {
        let scope = self.table.scope_mut(id);
        debug!("{name} in {} ({id}) is {class}", scope.name);
        scope.classes.insert(name.to_string(), class);
        class
    }
}
