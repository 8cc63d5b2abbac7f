//! Type registry: resolves each component type's requirements once, at startup.
//!
//! Hosts declare every secured type (and its parent) up front. `build()`
//! walks each ancestry chain a single time and freezes the result, so
//! extraction at request time is a map lookup.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use guardian_auth::{Permission, Requirement, RequirementSet};
use guardian_core::{ComponentKind, TypeKey};

/// Bundled login page, the default login destination.
pub const LOGIN_PAGE: TypeKey = TypeKey::from_static("LoginPage");

/// Bundled access-denied page, the default unauthorized destination.
pub const ACCESS_DENIED_PAGE: TypeKey = TypeKey::from_static("AccessDeniedPage");

static EMPTY: RequirementSet = RequirementSet::new();

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("type '{0}' is registered more than once")]
    Duplicate(TypeKey),

    #[error("type '{child}' extends unregistered type '{parent}'")]
    UnknownParent { child: TypeKey, parent: TypeKey },

    #[error("inheritance cycle through type '{0}'")]
    Cycle(TypeKey),

    #[error("type '{component}' requires malformed permission '{permission}'")]
    MalformedPermission { component: TypeKey, permission: Permission },
}

/// Declaration of one component type: what it is, what it extends, what it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    key: TypeKey,
    kind: ComponentKind,
    parent: Option<TypeKey>,
    requirements: Vec<Requirement>,
}

impl TypeDecl {
    pub fn page(key: TypeKey) -> Self {
        Self::new(key, ComponentKind::Page)
    }

    pub fn component(key: TypeKey) -> Self {
        Self::new(key, ComponentKind::Component)
    }

    fn new(key: TypeKey, kind: ComponentKind) -> Self {
        Self {
            key,
            kind,
            parent: None,
            requirements: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: TypeKey) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn requires(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn key(&self) -> &TypeKey {
        &self.key
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    decls: Vec<TypeDecl>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-loaded with the bundled login and access-denied pages.
    pub fn with_default_pages() -> Self {
        Self::new()
            .register(TypeDecl::page(LOGIN_PAGE))
            .register(TypeDecl::page(ACCESS_DENIED_PAGE))
    }

    pub fn register(mut self, decl: TypeDecl) -> Self {
        self.decls.push(decl);
        self
    }

    /// Resolve every declaration's ancestry into a frozen registry.
    pub fn build(self) -> Result<ComponentRegistry, RegistryError> {
        let mut by_key: HashMap<&TypeKey, &TypeDecl> = HashMap::with_capacity(self.decls.len());
        for decl in &self.decls {
            if by_key.insert(&decl.key, decl).is_some() {
                return Err(RegistryError::Duplicate(decl.key.clone()));
            }
            check_permissions(decl)?;
        }

        let mut types = HashMap::with_capacity(self.decls.len());
        for decl in &self.decls {
            let resolved = resolve(decl, &by_key)?;
            types.insert(decl.key.clone(), resolved);
        }

        tracing::info!(types = types.len(), "component registry built");
        Ok(ComponentRegistry { types })
    }
}

fn check_permissions(decl: &TypeDecl) -> Result<(), RegistryError> {
    let malformed = decl.requirements.iter().find_map(|requirement| match requirement {
        Requirement::Permissions { permissions, .. } => permissions.iter().find(|p| !p.is_well_formed()),
        _ => None,
    });
    match malformed {
        Some(permission) => Err(RegistryError::MalformedPermission {
            component: decl.key.clone(),
            permission: permission.clone(),
        }),
        None => Ok(()),
    }
}

fn resolve(decl: &TypeDecl, by_key: &HashMap<&TypeKey, &TypeDecl>) -> Result<ResolvedType, RegistryError> {
    let mut requirements = RequirementSet::new();
    let mut ancestry = Vec::new();
    let mut seen = HashSet::new();
    let mut is_page = false;

    let mut current = decl;
    loop {
        if !seen.insert(&current.key) {
            return Err(RegistryError::Cycle(current.key.clone()));
        }
        ancestry.push(current.key.clone());
        requirements.extend(current.requirements.iter().cloned());
        is_page |= current.kind == ComponentKind::Page;

        let Some(parent) = &current.parent else {
            break;
        };
        current = by_key.get(parent).copied().ok_or_else(|| RegistryError::UnknownParent {
            child: current.key.clone(),
            parent: parent.clone(),
        })?;
    }

    Ok(ResolvedType {
        is_page,
        ancestry,
        requirements,
    })
}

#[derive(Debug, Clone)]
struct ResolvedType {
    is_page: bool,
    /// The type itself first, then its ancestors up to the root.
    ancestry: Vec<TypeKey>,
    requirements: RequirementSet,
}

/// Immutable, shareable table from type key to resolved requirements.
///
/// Safe to read from any number of request threads.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    types: HashMap<TypeKey, ResolvedType>,
}

impl ComponentRegistry {
    /// Requirements of `key` and all its ancestors, most-derived first.
    ///
    /// Unregistered types declare nothing and yield the empty set.
    pub fn extract(&self, key: &TypeKey) -> &RequirementSet {
        match self.types.get(key) {
            Some(resolved) => &resolved.requirements,
            None => {
                tracing::trace!(component = %key, "unregistered type, no requirements");
                &EMPTY
            }
        }
    }

    /// Whether `key` is a page, directly or through an ancestor.
    pub fn is_page(&self, key: &TypeKey) -> bool {
        self.types.get(key).is_some_and(|t| t.is_page)
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.types.contains_key(key)
    }

    pub fn ancestry(&self, key: &TypeKey) -> Option<&[TypeKey]> {
        self.types.get(key).map(|t| t.ancestry.as_slice())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    const BASE: TypeKey = TypeKey::from_static("BasePage");
    const SECURE: TypeKey = TypeKey::from_static("SecurePage");
    const ADMIN: TypeKey = TypeKey::from_static("AdminPanel");
    const WIDGET: TypeKey = TypeKey::from_static("Widget");

    fn registry() -> ComponentRegistry {
        RegistryBuilder::new()
            .register(TypeDecl::page(BASE))
            .register(TypeDecl::component(SECURE).extends(BASE).requires(Requirement::User))
            .register(
                TypeDecl::component(ADMIN)
                    .extends(SECURE)
                    .requires(Requirement::role("admin"))
                    .requires(Requirement::User),
            )
            .register(TypeDecl::component(WIDGET))
            .build()
            .unwrap()
    }

    #[test]
    fn collects_most_derived_first_without_duplicates() {
        let reg = registry();
        assert_eq!(
            reg.extract(&ADMIN).as_slice(),
            &[Requirement::role("admin"), Requirement::User]
        );
        assert_eq!(reg.ancestry(&ADMIN).unwrap(), &[ADMIN, SECURE, BASE]);
    }

    #[test]
    fn malformed_permissions_are_rejected_at_build() {
        let err = RegistryBuilder::new()
            .register(TypeDecl::page(BASE).requires(Requirement::permission("report:")))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::MalformedPermission {
                component: BASE,
                permission: Permission::new("report:"),
            }
        );

        let err = RegistryBuilder::new()
            .register(TypeDecl::component(WIDGET).requires(Requirement::permission("a::b")))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::MalformedPermission { .. }));
    }

    #[test]
    fn unknown_and_undeclared_types_are_empty() {
        let reg = registry();
        assert!(reg.extract(&TypeKey::from_static("Nope")).is_empty());
        assert!(reg.extract(&BASE).is_empty());
        assert!(reg.extract(&WIDGET).is_empty());
    }

    #[test]
    fn page_kind_is_inherited() {
        let reg = registry();
        assert!(reg.is_page(&BASE));
        assert!(reg.is_page(&ADMIN));
        assert!(!reg.is_page(&WIDGET));
        assert!(!reg.is_page(&TypeKey::from_static("Nope")));
    }

    #[test]
    fn rejects_unknown_parent() {
        let err = RegistryBuilder::new()
            .register(TypeDecl::page(SECURE).extends(BASE))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::UnknownParent { child: SECURE, parent: BASE });
    }

    #[test]
    fn rejects_cycles_and_duplicates() {
        let err = RegistryBuilder::new()
            .register(TypeDecl::page(BASE).extends(SECURE))
            .register(TypeDecl::page(SECURE).extends(BASE))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::Cycle(_)));

        let err = RegistryBuilder::new()
            .register(TypeDecl::page(BASE))
            .register(TypeDecl::component(BASE))
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::Duplicate(BASE));
    }

    #[test]
    fn default_pages_are_registered_pages() {
        let reg = RegistryBuilder::with_default_pages().build().unwrap();
        assert!(reg.is_page(&LOGIN_PAGE));
        assert!(reg.is_page(&ACCESS_DENIED_PAGE));
    }

    #[test]
    fn concurrent_extraction_agrees() {
        let reg = Arc::new(registry());
        let expected = reg.extract(&ADMIN).clone();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&reg);
                thread::spawn(move || reg.extract(&ADMIN).clone())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    proptest! {
        /// A linear chain of types: extraction is idempotent, contains every
        /// declared requirement, and lists the most-derived type's first.
        #[test]
        fn chain_extraction_is_idempotent(roles in prop::collection::vec("[a-d]", 1..8)) {
            let keys: Vec<TypeKey> = (0..roles.len())
                .map(|i| TypeKey::parse(format!("T{i}")).unwrap())
                .collect();

            let mut builder = RegistryBuilder::new();
            for (i, role) in roles.iter().enumerate() {
                let mut decl = TypeDecl::component(keys[i].clone()).requires(Requirement::role(role.clone()));
                if i > 0 {
                    decl = decl.extends(keys[i - 1].clone());
                }
                builder = builder.register(decl);
            }
            let reg = builder.build().unwrap();

            let leaf = keys.last().unwrap();
            let first = reg.extract(leaf).clone();
            prop_assert_eq!(&first, reg.extract(leaf));
            prop_assert_eq!(first.as_slice().first(), Some(&Requirement::role(roles.last().unwrap().clone())));
            for role in &roles {
                prop_assert!(first.iter().any(|r| *r == Requirement::role(role.clone())));
            }
        }
    }
}
