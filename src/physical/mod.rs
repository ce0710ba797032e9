//! Physical types: the root upstream of all generated metadata.
//!
//! A physical type is the member view of a user-owned source type. The engine does not
//! parse Java; physical types come from a [`TypeLocator`], normally the in-memory
//! [`TypeRepository`] filled from the project file and kept current by the change
//! pipeline.
//!
//! [`PhysicalTypeProvider`] exposes them as metadata under the `PhysicalType` tag, so
//! every ITD provider can depend on its governor the same way it depends on any other
//! metadata, and a changed type invalidates everything generated from it.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use itdgen::metadata::MetadataService;
//! use itdgen::model::{JavaType, LogicalPath, TypeDetails};
//! use itdgen::physical::{PhysicalTypeProvider, TypeRepository, physical_type_id};
//!
//! # fn example() -> Result<(), itdgen::core::MetadataError> {
//! let repository = TypeRepository::shared();
//! let customer = JavaType::new("com.example.Customer");
//! repository.write().unwrap().upsert(TypeDetails::class(customer.clone(), LogicalPath::src_main_java()));
//!
//! let mut service = MetadataService::new();
//! service.register_provider(Arc::new(PhysicalTypeProvider::new(repository)))?;
//! let item = service.get(&physical_type_id(&customer, &LogicalPath::src_main_java()))?;
//! assert!(item.type_details().is_some());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use tracing::trace;

use crate::core::MetadataError;
use crate::metadata::{
    MetadataContext, MetadataId, MetadataItem, MetadataProvider, Payload, ProviderTag,
};
use crate::model::{JavaType, LogicalPath, TypeDetails};

/// Tag of physical type metadata.
pub const PHYSICAL_TYPE: &str = "PhysicalType";

static PHYSICAL_TYPE_TAG: LazyLock<ProviderTag> =
    LazyLock::new(|| ProviderTag::from_static(PHYSICAL_TYPE));

/// The `PhysicalType` provider tag.
pub fn physical_type_tag() -> &'static ProviderTag {
    &PHYSICAL_TYPE_TAG
}

/// The physical type identifier of `name` at `path`.
pub fn physical_type_id(name: &JavaType, path: &LogicalPath) -> MetadataId {
    MetadataId::create(physical_type_tag(), name, path)
}

/// Source of parsed physical types.
pub trait TypeLocator: Send + Sync {
    /// The type addressed by a `PhysicalType` identifier, if it exists at that path.
    fn type_details(&self, id: &MetadataId) -> Option<TypeDetails>;
}

/// Repository shared between the provider and whoever applies source changes.
pub type SharedTypeRepository = Arc<RwLock<TypeRepository>>;

/// In-memory physical types keyed by fully qualified name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRepository {
    types: BTreeMap<JavaType, TypeDetails>,
}

impl TypeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty repository behind a shared lock.
    pub fn shared() -> SharedTypeRepository {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Insert or replace a type, returning the previous description.
    pub fn upsert(&mut self, details: TypeDetails) -> Option<TypeDetails> {
        trace!("Upserting physical type {}", details.name);
        self.types.insert(details.name.clone(), details)
    }

    pub fn remove(&mut self, name: &JavaType) -> Option<TypeDetails> {
        self.types.remove(name)
    }

    pub fn get(&self, name: &JavaType) -> Option<&TypeDetails> {
        self.types.get(name)
    }

    /// Types in name order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDetails> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<TypeDetails> for TypeRepository {
    fn from_iter<I: IntoIterator<Item = TypeDetails>>(iter: I) -> Self {
        let mut repository = Self::new();
        for details in iter {
            repository.upsert(details);
        }
        repository
    }
}

impl TypeLocator for TypeRepository {
    fn type_details(&self, id: &MetadataId) -> Option<TypeDetails> {
        if id.provider_tag() != physical_type_tag() {
            return None;
        }
        let details = self.types.get(id.target_type()?)?;
        (Some(&details.path) == id.path()).then(|| details.clone())
    }
}

impl TypeLocator for RwLock<TypeRepository> {
    fn type_details(&self, id: &MetadataId) -> Option<TypeDetails> {
        self.read().unwrap_or_else(PoisonError::into_inner).type_details(id)
    }
}

/// Exposes physical types as metadata.
pub struct PhysicalTypeProvider {
    locator: Arc<dyn TypeLocator>,
}

impl PhysicalTypeProvider {
    pub fn new(locator: Arc<dyn TypeLocator>) -> Self {
        Self {
            locator,
        }
    }
}

impl MetadataProvider for PhysicalTypeProvider {
    fn provides_type(&self) -> &ProviderTag {
        physical_type_tag()
    }

    fn get(
        &self,
        id: &MetadataId,
        _ctx: &mut MetadataContext<'_>,
    ) -> Result<MetadataItem, MetadataError> {
        match self.locator.type_details(id) {
            Some(details) => Ok(MetadataItem::valid(
                id.clone(),
                Payload::PhysicalType(Arc::new(details)),
            )),
            None => Ok(MetadataItem::invalid(id.clone(), format!("no physical type for {id}"))),
        }
    }
}
