//! The package-graph contract.
//!
//! Loading a package set with full type information — parser, type checker,
//! module resolver — is explicitly out of scope: the core consumes a
//! package graph with (a) AST nodes, (b) a type for every expression, (c) a
//! use/def table linking identifiers to declarations.
//!
//! This module defines that contract as plain Rust data rather than
//! wrapping a real Go frontend. Declarations and expressions are identified
//! by small arena indices (`DeclId`, `ExprId`) — surrogate keys standing in
//! for whatever native notion of "declaration object" a real loader has: a
//! stable surrogate key, such as the position of a declaration in its
//! source file, works equally well as a pointer-identity handle.

use std::collections::HashMap;
use std::rc::Rc;

/// Identifies a variable/parameter declaration (a local, not its uses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

/// Identifies an expression node within a `PackageGraph`'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub u32);

/// A folded constant value, as produced by the type checker's constant table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstValue {
    /// A folded string constant.
    Str(String),
    /// A folded integer constant.
    Int(i64),
}

impl ConstValue {
    /// Returns the value as a string, if it is a string constant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::Str(s) => Some(s),
            ConstValue::Int(_) => None,
        }
    }
}

/// A primitive (basic) type recognized by the schema lowering dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// `bool`.
    Bool,
    /// `string`.
    String,
    /// The generic integer family (`int`, `int8`, `uint16`, `byte`, `rune`, ...).
    Int,
    /// `int32` / `rune`-as-32-bit, carrying an explicit `int32` format.
    Int32,
    /// `int64`, carrying an explicit `int64` format.
    Int64,
    /// `float32` / `float64`.
    Float,
}

/// A field of a struct type.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Go field name, as written in source.
    pub name: String,
    /// The field's type.
    pub ty: Rc<GoType>,
    /// Whether the field's name starts with an uppercase letter.
    pub exported: bool,
    /// Whether this is an embedded (anonymous) field.
    pub embedded: bool,
    /// Raw struct tag string, e.g. `json:"a,omitempty" form:"b"`, if present.
    pub tag: Option<String>,
}

/// A type, as reported by the type checker for some expression or field.
#[derive(Debug, Clone)]
pub enum GoType {
    /// A defined (named) type, with its underlying representation.
    Named {
        /// Canonical name, e.g. `github.com/gin-gonic/gin.Engine` or
        /// `myapp/models.User`.
        name: String,
        /// The type this name is defined in terms of.
        underlying: Rc<GoType>,
    },
    /// `*T`.
    Pointer(Rc<GoType>),
    /// An unnamed struct type.
    Struct(Vec<FieldDecl>),
    /// `interface{}` (or any interface type) — lowered opaquely.
    Interface,
    /// `[]T`.
    Slice(Rc<GoType>),
    /// `map[K]V`.
    Map(Rc<GoType>, Rc<GoType>),
    /// A basic/primitive type.
    Primitive(Primitive),
    /// A type the classifier/registry has no information about.
    Unknown,
}

impl GoType {
    /// Strips one level of `Pointer`, returning the pointee, or `self` if not a pointer.
    pub fn deref_once(self: &Rc<Self>) -> Rc<GoType> {
        match self.as_ref() {
            GoType::Pointer(inner) => Rc::clone(inner),
            _ => Rc::clone(self),
        }
    }

    /// The canonical, fully-qualified name of this type, as used to compare
    /// against a configured framework type name (e.g. the context
    /// receiver's `*github.com/gin-gonic/gin.Context`). `None` for types
    /// with no name at any level (unnamed structs, primitives, ...).
    pub fn canonical_name(&self) -> Option<String> {
        match self {
            GoType::Named { name, .. } => Some(name.clone()),
            GoType::Pointer(inner) => inner.canonical_name().map(|n| format!("*{n}")),
            _ => None,
        }
    }
}

/// A formal parameter of a function or function literal.
#[derive(Debug, Clone)]
pub struct Param {
    /// The declaration introduced by this parameter.
    pub decl: DeclId,
    /// Parameter name as written.
    pub name: String,
    /// Parameter type.
    pub ty: Rc<GoType>,
}

/// An expression node. Expressions reference each other by `ExprId` so that
/// the arena can be shared and expressions can be looked up by identity
/// (needed by the group-by-expression map that backs router-call dispatch).
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// A bare identifier, optionally resolved to the declaration it refers to.
    Ident {
        /// Identifier text.
        name: String,
        /// The declaration this identifier resolves to, if it is a use of a
        /// local variable or parameter (vs. a package name, type name, etc.).
        decl: Option<DeclId>,
    },
    /// `base.sel`.
    Selector {
        /// The expression before the dot.
        base: ExprId,
        /// The selected name.
        sel: String,
    },
    /// `func(args...)`.
    Call {
        /// The called expression (typically a `Selector` or `Ident`).
        func: ExprId,
        /// Argument expressions, in source order.
        args: Vec<ExprId>,
    },
    /// A string literal/constant expression.
    StringLit(String),
    /// An integer literal/constant expression.
    IntLit(i64),
    /// A function literal (closure), as passed as the final handler argument.
    FuncLit {
        /// Declared parameters (conventionally a single `*gin.Context`).
        params: Vec<Param>,
        /// Statements making up the function body.
        body: Vec<Stmt>,
    },
    /// Anything else (struct literals, binary expressions, ...) that the
    /// engine does not need to interpret structurally.
    Other,
}

/// A single arena-allocated expression node.
#[derive(Debug, Clone)]
pub struct ExprNode {
    /// The expression's shape.
    pub kind: ExprKind,
}

/// A statement within a function or function-literal body.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `lhs... = rhs...` or `lhs... := rhs...` (`define` distinguishes the two).
    Assign {
        /// Left-hand side expressions (only `Ident`s introduce bindings).
        lhs: Vec<ExprId>,
        /// Right-hand side expressions, positionally paired with `lhs`.
        rhs: Vec<ExprId>,
        /// Whether this is a declaring assignment (`:=` or `var`).
        define: bool,
    },
    /// A bare expression statement, most commonly a call.
    Expr(ExprId),
    /// A nested block.
    Block(Vec<Stmt>),
    /// `if cond { then } else { else }`.
    If {
        /// The condition expression (not interpreted by the engine).
        cond: ExprId,
        /// The `then` branch.
        then_branch: Vec<Stmt>,
        /// The optional `else` branch.
        else_branch: Option<Vec<Stmt>>,
    },
}

/// A top-level function declaration.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    /// Function name.
    pub name: String,
    /// Whether the name starts with an uppercase letter.
    pub exported: bool,
    /// Formal parameters.
    pub params: Vec<Param>,
    /// Function body.
    pub body: Vec<Stmt>,
}

/// A single source file, holding only what the engine needs: its function
/// declarations. Struct type declarations are carried directly on
/// `GoType::Struct`/`Named` rather than as separate file-level items.
#[derive(Debug, Clone, Default)]
pub struct File {
    /// Filename, used only for diagnostic/descriptive purposes.
    pub path: String,
    /// Function declarations in this file, in source order.
    pub funcs: Vec<FuncDecl>,
}

/// A single package: an import path, a package name, and its files.
#[derive(Debug, Clone, Default)]
pub struct Package {
    /// Full import path, e.g. `myapp/internal/routes`.
    pub import_path: String,
    /// Package (short) name, as used by importers (`import pkgname "path"`).
    pub name: String,
    /// Source files belonging to this package.
    pub files: Vec<File>,
}

impl Package {
    /// Iterates all function declarations across all files of this package,
    /// in file order. Generalizes beyond looking only at a package's first
    /// file, so a callee can live in any file of the imported package.
    pub fn all_funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.files.iter().flat_map(|f| f.funcs.iter())
    }
}

/// The read-only package graph supplied by the (external) loader.
#[derive(Debug, Default)]
pub struct PackageGraph {
    /// All loaded packages, in loader order. The entry package defaults to
    /// the last one.
    pub packages: Vec<Package>,
    /// Arena of all expression nodes referenced by any package's AST.
    pub exprs: ExprArena,
    /// `expression -> type` table, as produced by the type checker.
    pub expr_types: HashMap<ExprId, Rc<GoType>>,
    /// `expression -> constant value` table, populated only for expressions
    /// the type checker proved constant.
    pub expr_const: HashMap<ExprId, ConstValue>,
}

impl PackageGraph {
    /// Returns the conventional entry package: the last one loaded, unless
    /// `entry_package` names a specific import path.
    pub fn entry_package<'a>(&'a self, entry_package: Option<&str>) -> Option<&'a Package> {
        if let Some(path) = entry_package {
            return self.packages.iter().find(|p| p.import_path == path);
        }
        self.packages.last()
    }

    /// Looks up a loaded package by import path.
    pub fn package_by_path(&self, import_path: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.import_path == import_path)
    }

    /// Looks up a loaded package by its short (importer-facing) name.
    ///
    /// Cross-package call following resolves an imported package by the
    /// identifier used to select into it (`pkgA.Up(...)`); this engine
    /// does not model per-file import aliasing separately from a
    /// package's own short name, so the two are treated as the same thing.
    pub fn package_by_name(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// The type recorded for an expression, if any.
    pub fn type_of(&self, expr: ExprId) -> Rc<GoType> {
        self.expr_types
            .get(&expr)
            .cloned()
            .unwrap_or(Rc::new(GoType::Unknown))
    }

    /// The constant value recorded for an expression, if any.
    pub fn const_of(&self, expr: ExprId) -> Option<&ConstValue> {
        self.expr_const.get(&expr)
    }
}

/// Append-only arena of expression nodes.
#[derive(Debug, Default, Clone)]
pub struct ExprArena {
    nodes: Vec<ExprNode>,
}

impl ExprArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new expression node, returning its id.
    pub fn alloc(&mut self, kind: ExprKind) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(ExprNode { kind });
        id
    }

    /// Looks up a node by id.
    ///
    /// # Panics
    /// Panics if `id` was not allocated by this arena — every `ExprId` in a
    /// well-formed `PackageGraph` was allocated from its own `exprs` arena.
    pub fn get(&self, id: ExprId) -> &ExprNode {
        &self.nodes[id.0 as usize]
    }
}
