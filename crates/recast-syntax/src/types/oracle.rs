//! Class metadata and the oracle interface used for type questions.

use std::collections::HashMap;

use super::{OBJECT, TypeDescriptor, jdk};

/// Supertype chains deeper than this are treated as unknown.
const MAX_HIERARCHY_DEPTH: usize = 64;

/// The declaration form of a class-like type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
    /// `record`
    Record,
    /// `@interface`
    Annotation,
}

/// A method signature known to the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Simple method name.
    pub name: String,
    /// Parameter types in declaration order.
    pub parameters: Vec<TypeDescriptor>,
    /// Declared return type.
    pub return_type: TypeDescriptor,
}

impl MethodSignature {
    /// Creates a method signature.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<TypeDescriptor>,
        return_type: TypeDescriptor,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_type,
        }
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// Metadata describing one class-like type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    fqn: String,
    kind: ClassKind,
    superclass: Option<String>,
    interfaces: Vec<String>,
    methods: Vec<MethodSignature>,
    has_unresolved_supertypes: bool,
}

impl ClassInfo {
    /// Creates metadata for a type with no declared supertypes.
    #[must_use]
    pub fn new(fqn: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            fqn: fqn.into(),
            kind,
            superclass: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            has_unresolved_supertypes: false,
        }
    }

    /// Sets the superclass.
    #[must_use]
    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Adds an implemented (or, for interfaces, extended) interface.
    #[must_use]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Adds a method signature.
    #[must_use]
    pub fn with_method(mut self, method: MethodSignature) -> Self {
        self.methods.push(method);
        self
    }

    /// Records that at least one declared supertype could not be resolved.
    #[must_use]
    pub const fn with_unresolved_supertypes(mut self, unresolved: bool) -> Self {
        self.has_unresolved_supertypes = unresolved;
        self
    }

    /// Returns the fully qualified name.
    #[must_use]
    pub fn fqn(&self) -> &str {
        &self.fqn
    }

    /// Returns the declaration kind.
    #[must_use]
    pub const fn kind(&self) -> ClassKind {
        self.kind
    }

    /// Returns the declared superclass, if any.
    #[must_use]
    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// Returns the declared interfaces.
    #[must_use]
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Returns the declared methods.
    #[must_use]
    pub fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }

    /// Returns `true` if some declared supertype is unknown.
    #[must_use]
    pub const fn has_unresolved_supertypes(&self) -> bool {
        self.has_unresolved_supertypes
    }

    /// Iterates over the direct supertypes.
    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.superclass
            .as_deref()
            .into_iter()
            .chain(self.interfaces.iter().map(String::as_str))
    }
}

/// Answers type questions about classes by fully qualified name.
///
/// Implementations supply [`TypeOracle::class`]; the remaining questions have
/// provided implementations that walk the supertype graph. Every answer is an
/// `Option`: `None` means the oracle cannot decide.
pub trait TypeOracle: Send + Sync {
    /// Returns metadata for a class, if known.
    fn class(&self, fqn: &str) -> Option<&ClassInfo>;

    /// Decides whether `ty` is assignable to the class named `target`.
    fn is_subtype(&self, ty: &TypeDescriptor, target: &str) -> Option<bool> {
        match ty {
            TypeDescriptor::Class { fqn } | TypeDescriptor::Parameterized { fqn, .. } => {
                class_is_subtype(self, fqn, target, 0)
            }
            TypeDescriptor::Array(_) => Some(matches!(
                target,
                OBJECT | "java.lang.Cloneable" | "java.io.Serializable"
            )),
            TypeDescriptor::Null => Some(true),
            TypeDescriptor::Primitive(_) => Some(false),
            TypeDescriptor::TypeVariable { .. } => (target == OBJECT).then_some(true),
        }
    }

    /// Decides whether the named class is an interface.
    fn is_interface(&self, fqn: &str) -> Option<bool> {
        self.class(fqn).map(|info| info.kind() == ClassKind::Interface)
    }

    /// Finds a method by name and arity on a class or its supertypes.
    fn method(&self, owner: &str, name: &str, arity: usize) -> Option<&MethodSignature> {
        find_method(self, owner, name, arity, 0)
    }
}

fn class_is_subtype<O: TypeOracle + ?Sized>(
    oracle: &O,
    fqn: &str,
    target: &str,
    depth: usize,
) -> Option<bool> {
    if fqn == target || target == OBJECT {
        return Some(true);
    }
    if depth > MAX_HIERARCHY_DEPTH {
        return None;
    }
    let info = oracle.class(fqn)?;
    let mut undecided = info.has_unresolved_supertypes();
    for supertype in info.supertypes() {
        match class_is_subtype(oracle, supertype, target, depth + 1) {
            Some(true) => return Some(true),
            Some(false) => {}
            None => undecided = true,
        }
    }
    if undecided { None } else { Some(false) }
}

fn find_method<'o, O: TypeOracle + ?Sized>(
    oracle: &'o O,
    owner: &str,
    name: &str,
    arity: usize,
    depth: usize,
) -> Option<&'o MethodSignature> {
    if depth > MAX_HIERARCHY_DEPTH {
        return None;
    }
    let info = oracle.class(owner)?;
    if let Some(found) = info
        .methods()
        .iter()
        .find(|method| method.name == name && method.arity() == arity)
    {
        return Some(found);
    }
    let inherited = info
        .supertypes()
        .find_map(|supertype| find_method(oracle, supertype, name, arity, depth + 1));
    inherited.or_else(|| {
        (owner != OBJECT && info.superclass().is_none())
            .then(|| find_method(oracle, OBJECT, name, arity, depth + 1))
            .flatten()
    })
}

/// An in-memory table of class metadata.
///
/// # Example
///
/// ```
/// use recast_syntax::{ClassInfo, ClassKind, TypeDescriptor, TypeOracle, TypeTable};
///
/// let mut table = TypeTable::with_jdk();
/// table.insert(ClassInfo::new("com.acme.Order", ClassKind::Class).implements("java.io.Serializable"));
/// let order = TypeDescriptor::class("com.acme.Order");
/// assert_eq!(table.is_subtype(&order, "java.io.Serializable"), Some(true));
/// assert_eq!(table.is_subtype(&order, "java.lang.Throwable"), Some(false));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    classes: HashMap<String, ClassInfo>,
}

impl TypeTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table pre-populated with common JDK types.
    #[must_use]
    pub fn with_jdk() -> Self {
        let mut table = Self::new();
        for info in jdk::classes() {
            table.insert(info);
        }
        table
    }

    /// Adds or replaces a class.
    pub fn insert(&mut self, info: ClassInfo) {
        self.classes.insert(info.fqn().to_owned(), info);
    }

    /// Returns the number of known classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if the table knows no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TypeOracle for TypeTable {
    fn class(&self, fqn: &str) -> Option<&ClassInfo> {
        self.classes.get(fqn)
    }
}

/// Consults a unit-local table before falling back to a shared oracle.
#[derive(Clone, Copy)]
pub struct LayeredOracle<'a> {
    local: &'a TypeTable,
    base: &'a dyn TypeOracle,
}

impl<'a> LayeredOracle<'a> {
    /// Layers `local` over `base`.
    #[must_use]
    pub const fn new(local: &'a TypeTable, base: &'a dyn TypeOracle) -> Self {
        Self { local, base }
    }
}

impl TypeOracle for LayeredOracle<'_> {
    fn class(&self, fqn: &str) -> Option<&ClassInfo> {
        self.local.class(fqn).or_else(|| self.base.class(fqn))
    }
}

impl std::fmt::Debug for LayeredOracle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredOracle")
            .field("local", &self.local.len())
            .finish_non_exhaustive()
    }
}
