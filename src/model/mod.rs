//! Java metamodel value objects.
//!
//! The engine never parses Java. It consumes an already-parsed description of each
//! governor type ([`TypeDetails`]) and produces the same member types for the ITDs it
//! synthesizes. Everything here is immutable data with structural equality.
//!
//! # Modules
//!
//! - `java_type` - [`JavaType`], fully qualified (optionally generic) type references
//! - `symbol` - [`JavaSymbolName`], validated identifiers
//! - `path` - [`LogicalPath`] and [`Modifier`]
//! - `members` - annotations, fields, methods
//! - `type_details` - [`TypeDetails`], the member view of one physical type

mod java_type;
mod members;
mod path;
mod symbol;
mod type_details;

pub use java_type::JavaType;
pub use members::{
    AnnotationAttributeValue, AnnotationMetadata, FieldMetadata, MethodMetadata, MethodParameter,
    find_annotation,
};
pub use path::{LogicalPath, Modifier};
pub use symbol::{JavaSymbolName, capitalize, is_java_identifier, uncapitalize};
pub use type_details::{TypeCategory, TypeDetails};

/// Annotation and library types the built-in generators inspect.
pub mod well_known {
    use super::JavaType;

    pub const ROO_JAVA_BEAN: &str = "org.springframework.roo.addon.javabean.RooJavaBean";
    pub const ROO_DATA_ON_DEMAND: &str = "org.springframework.roo.addon.dod.RooDataOnDemand";

    pub const COMPONENT: &str = "org.springframework.stereotype.Component";
    pub const AUTOWIRED: &str = "org.springframework.beans.factory.annotation.Autowired";
    pub const TRANSACTIONAL: &str = "org.springframework.transaction.annotation.Transactional";
    pub const PROPAGATION: &str = "org.springframework.transaction.annotation.Propagation";

    pub const ID: &str = "javax.persistence.Id";
    pub const VERSION: &str = "javax.persistence.Version";
    pub const TRANSIENT: &str = "javax.persistence.Transient";
    pub const ONE_TO_MANY: &str = "javax.persistence.OneToMany";
    pub const MANY_TO_ONE: &str = "javax.persistence.ManyToOne";
    pub const ONE_TO_ONE: &str = "javax.persistence.OneToOne";
    pub const ENUMERATED: &str = "javax.persistence.Enumerated";

    pub const NOT_NULL: &str = "javax.validation.constraints.NotNull";
    pub const SIZE: &str = "javax.validation.constraints.Size";
    pub const MIN: &str = "javax.validation.constraints.Min";
    pub const MAX: &str = "javax.validation.constraints.Max";
    pub const PAST: &str = "javax.validation.constraints.Past";
    pub const FUTURE: &str = "javax.validation.constraints.Future";

    pub const DATE: &str = "java.util.Date";
    pub const CALENDAR: &str = "java.util.Calendar";
    pub const RANDOM: &str = "java.util.Random";
    pub const LIST: &str = "java.util.List";

    /// Shorthand for `JavaType::new(name)` on one of the constants above.
    pub fn ty(name: &str) -> JavaType {
        JavaType::new(name)
    }
}
