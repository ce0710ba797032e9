//! Data-on-demand test fixtures.
//!
//! A governor annotated `@RooDataOnDemand(entity = Customer.class)` becomes a Spring
//! component that can build transient `Customer` instances and hand out persisted ones.
//! The generator inspects the entity's declared fields to decide which mutators to call
//! and with what argument:
//!
//! | Field | Argument |
//! |-------|----------|
//! | `String` | `"name_" + index`, clamped by `@Size`, `@Max` and `@Min` |
//! | numbers | `new Integer(index)` and its `doubleValue()`-style conversions |
//! | `boolean` / `Boolean` | `true` / `new Boolean(true)` |
//! | `Date` / `Calendar` | now, or shifted by `@Past` / `@Future` |
//! | `@Enumerated` | the first enum constant |
//! | `@ManyToOne` / `@OneToOne` | an instance from the related entity's own data-on-demand |
//!
//! `@Id`, `@Version`, `@Transient`, `@OneToMany` and collection fields are left alone.
//! Apart from dates, a field with annotations but no `@NotNull`, `@Size`, `@Min` or `@Max`
//! receives `null`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use itdgen::addons::dod::string_initializer;
//! use itdgen::model::{AnnotationAttributeValue, AnnotationMetadata, FieldMetadata, JavaSymbolName, JavaType, well_known};
//!
//! let field = FieldMetadata::new(JavaSymbolName::new("code").unwrap(), JavaType::string())
//!     .with_annotation(
//!         AnnotationMetadata::marker(well_known::ty(well_known::SIZE))
//!             .with_attribute(JavaSymbolName::new("max").unwrap(), AnnotationAttributeValue::Integer(4)),
//!     );
//! assert_eq!(string_initializer(&field), "\"co_\" + index");
//! ```

use std::sync::LazyLock;

use tracing::debug;

use super::javabean::{java_bean_tag, mutator_name};
use crate::constants::DEFAULT_DOD_QUANTITY;
use crate::core::MetadataError;
use crate::itd::{Generation, InvocableMemberBodyBuilder, ItdGenerator, ItdRequest, ItdTypeDetailsBuilder};
use crate::metadata::{MetadataContext, MetadataId, ProviderTag};
use crate::model::{
    AnnotationAttributeValue, AnnotationMetadata, FieldMetadata, JavaSymbolName, JavaType, LogicalPath,
    MethodMetadata, TypeDetails, uncapitalize, well_known,
};
use crate::physical::physical_type_id;

/// Tag of data-on-demand metadata.
pub const DATA_ON_DEMAND: &str = "DataOnDemand";

static DATA_ON_DEMAND_TAG: LazyLock<ProviderTag> =
    LazyLock::new(|| ProviderTag::from_static(DATA_ON_DEMAND));

pub fn data_on_demand_tag() -> &'static ProviderTag {
    &DATA_ON_DEMAND_TAG
}

/// Offset in milliseconds applied to `@Past` and `@Future` dates.
const DATE_SHIFT_MILLIS: &str = "10000000L";

/// A mutator call in `getNewTransient<Entity>`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Property {
    field: JavaSymbolName,
    mutator: JavaSymbolName,
    initializer: String,
    /// Maximum string length enforced after the initializer runs.
    clamp: Option<i64>,
}

/// Names the generated code refers to.
struct Names<'a> {
    entity: &'a JavaType,
    simple: &'a str,
    rnd: JavaSymbolName,
    data: JavaSymbolName,
    id_accessor: JavaSymbolName,
    quantity: i64,
}

/// Generator behind the `DataOnDemand` provider.
#[derive(Debug, Default)]
pub struct DataOnDemandGenerator;

impl ItdGenerator for DataOnDemandGenerator {
    fn tag(&self) -> &ProviderTag {
        data_on_demand_tag()
    }

    fn aspect_suffix(&self) -> &str {
        DATA_ON_DEMAND
    }

    fn triggers(&self) -> Vec<JavaType> {
        vec![well_known::ty(well_known::ROO_DATA_ON_DEMAND)]
    }

    fn generate(
        &self,
        request: &ItdRequest,
        mut builder: ItdTypeDetailsBuilder,
        ctx: &mut MetadataContext<'_>,
    ) -> Result<Generation, MetadataError> {
        let Some(entity) = request.trigger.attribute("entity").and_then(AnnotationAttributeValue::as_class)
        else {
            return Ok(Generation::Invalid("@RooDataOnDemand has no entity".to_string()));
        };
        let quantity = request
            .trigger
            .attribute("quantity")
            .and_then(AnnotationAttributeValue::as_integer)
            .unwrap_or(DEFAULT_DOD_QUANTITY);
        if quantity < 1 {
            return Ok(Generation::Invalid(format!("quantity must be positive, got {quantity}")));
        }

        let entity_path = LogicalPath::src_main_java();
        let physical = ctx.require(&physical_type_id(entity, &entity_path))?;
        let Some(entity_details) = physical.type_details().cloned() else {
            return Ok(Generation::Invalid(format!("{entity} is not a physical type")));
        };
        let java_bean = ctx.require(&MetadataId::create(java_bean_tag(), entity, &entity_path))?;
        let bean_methods = java_bean.itd().map(|itd| itd.methods().to_vec()).unwrap_or_default();

        let Some(id_field) = entity_details.fields.iter().find(|f| f.has_annotation(&ann(well_known::ID)))
        else {
            return Ok(Generation::Invalid(format!("{entity} has no @Id field")));
        };
        let id_accessor = id_field.name.prefixed("get");

        let mut collaborators: Vec<JavaType> = Vec::new();
        let mut properties = Vec::new();
        for field in entity_details.fields.iter().filter(|f| !f.modifier.is_static()) {
            if is_skipped(field) {
                continue;
            }
            let mutator = mutator_name(field);
            let parameter_types = [field.field_type.clone()];
            let declared = entity_details.method(&mutator, &parameter_types).is_some()
                || bean_methods.iter().any(|m| m.matches_signature(&mutator, &parameter_types));
            if !declared {
                debug!("{entity} has no {mutator}({}); not populated", field.field_type);
                continue;
            }
            let initializer = initializer_for(field, entity, &mut collaborators)?;
            properties.push(Property {
                field: field.name.clone(),
                mutator,
                initializer,
                clamp: string_clamp(field),
            });
        }

        let governor = &request.governor;
        if !governor.has_annotation(&ann(well_known::COMPONENT)) {
            builder.add_type_annotation(AnnotationMetadata::marker(ann(well_known::COMPONENT)));
        }

        let random = ann(well_known::RANDOM);
        let rnd = match unique_field(governor, "rnd", &random) {
            Some(name) => name,
            None => {
                let name = free_name(governor, "rnd")?;
                builder.add_field(
                    FieldMetadata::new(name.clone(), random).with_initializer("new java.security.SecureRandom()"),
                );
                name
            }
        };

        let list = JavaType::with_parameters(well_known::LIST, vec![entity.clone()]);
        let data = match unique_field(governor, "data", &list) {
            Some(name) => name,
            None => {
                let name = free_name(governor, "data")?;
                builder.add_field(FieldMetadata::new(name.clone(), list));
                name
            }
        };

        for collaborator in &collaborators {
            let dod_type = collaborator.with_suffix(DATA_ON_DEMAND);
            let name = JavaSymbolName::new(collaborator_field_name(collaborator))?;

            // reading the collaborator's metadata makes this item follow its changes
            let other = MetadataId::create(data_on_demand_tag(), &dod_type, &LogicalPath::src_test_java());
            if !ctx.get(&other)?.is_valid() {
                debug!("{other} is not valid; assuming conventional method names");
            }

            if let Some(existing) = governor.field(&name) {
                let autowired = existing.has_annotation(&ann(well_known::AUTOWIRED));
                if existing.field_type != dod_type || !existing.modifier.is_private() || !autowired {
                    return Ok(Generation::Invalid(format!(
                        "field {name} must be a private @Autowired {dod_type}"
                    )));
                }
                continue;
            }

            builder.add_field(
                FieldMetadata::new(name, dod_type)
                    .with_annotation(AnnotationMetadata::marker(ann(well_known::AUTOWIRED))),
            );
        }

        let names = Names {
            entity,
            simple: entity.simple_name(),
            rnd,
            data,
            id_accessor,
            quantity,
        };

        let methods = [
            new_transient_method(&names, &properties)?,
            specific_method(&names)?,
            random_method(&names)?,
            modify_method(&names)?,
            init_method(&names)?,
        ];
        for method in methods {
            if let Some(existing) = governor.method(&method.name, &parameter_types(&method)) {
                if existing.return_type != method.return_type {
                    return Ok(Generation::Invalid(format!(
                        "{} must return {}",
                        method.signature(),
                        method.return_type
                    )));
                }
                continue;
            }
            builder.add_method(method);
        }

        Ok(Generation::Itd(builder))
    }
}

fn ann(name: &str) -> JavaType {
    well_known::ty(name)
}

fn parameter_types(method: &MethodMetadata) -> Vec<JavaType> {
    method.parameters.iter().map(|p| p.param_type.clone()).collect()
}

fn is_skipped(field: &FieldMetadata) -> bool {
    [well_known::ID, well_known::VERSION, well_known::TRANSIENT, well_known::ONE_TO_MANY]
        .iter()
        .any(|a| field.has_annotation(&ann(a)))
        || field.field_type.is_common_collection()
}

/// `com.example.Order` -> `orderDataOnDemand`.
fn collaborator_field_name(collaborator: &JavaType) -> String {
    uncapitalize(collaborator.with_suffix(DATA_ON_DEMAND).simple_name())
}

/// Candidate names `base`, `_base`, `__base`, ...
fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    (0usize..).map(move |depth| format!("{}{base}", "_".repeat(depth)))
}

/// A user-declared private field of type `ty` among the candidate names, stopping at
/// the first candidate the governor does not declare.
fn unique_field(governor: &TypeDetails, base: &str, ty: &JavaType) -> Option<JavaSymbolName> {
    for candidate in candidates(base) {
        let field = governor.fields.iter().find(|f| f.name.as_str() == candidate)?;
        if field.modifier.is_private() && &field.field_type == ty {
            return Some(field.name.clone());
        }
    }
    None
}

/// The first candidate name the governor does not declare.
fn free_name(governor: &TypeDetails, base: &str) -> Result<JavaSymbolName, MetadataError> {
    let name = candidates(base)
        .find(|candidate| governor.fields.iter().all(|f| f.name.as_str() != candidate))
        .unwrap_or_else(|| base.to_string());
    JavaSymbolName::new(name)
}

fn annotation_integer(field: &FieldMetadata, annotation: &str, attribute: &str) -> Option<i64> {
    field.annotation(&ann(annotation))?.attribute(attribute)?.as_integer()
}

/// The length a `String` argument is cut to after generation. `@Max(value)` wins over
/// `@Size(max)` when both are present.
fn string_clamp(field: &FieldMetadata) -> Option<i64> {
    if field.field_type != JavaType::string() {
        return None;
    }
    annotation_integer(field, well_known::MAX, "value")
        .or_else(|| annotation_integer(field, well_known::SIZE, "max"))
}

/// The `"<base>_" + index` expression for a `String` field.
///
/// The two characters added by `_` and at least one index digit are accounted for when
/// shortening to a maximum or padding with `x` up to a minimum.
pub fn string_initializer(field: &FieldMetadata) -> String {
    let mut base = field.name.as_str().to_string();

    let fit = |base: &mut String, max: Option<i64>, min: Option<i64>| {
        if let Some(max) = max.and_then(|m| usize::try_from(m).ok()) {
            if base.len() + 2 > max {
                base.truncate(max.saturating_sub(2));
            }
        }
        if let Some(min) = min.and_then(|m| usize::try_from(m).ok()) {
            if base.len() + 2 < min {
                let target = min - 2;
                while base.len() < target {
                    base.push('x');
                }
            }
        }
    };

    fit(
        &mut base,
        annotation_integer(field, well_known::SIZE, "max"),
        annotation_integer(field, well_known::SIZE, "min"),
    );
    fit(
        &mut base,
        annotation_integer(field, well_known::MAX, "value"),
        annotation_integer(field, well_known::MIN, "value"),
    );

    format!("\"{base}_\" + index")
}

fn date_initializer(field: &FieldMetadata) -> String {
    if field.has_annotation(&ann(well_known::PAST)) {
        format!("new java.util.Date(new java.util.Date().getTime() - {DATE_SHIFT_MILLIS})")
    } else if field.has_annotation(&ann(well_known::FUTURE)) {
        format!("new java.util.Date(new java.util.Date().getTime() + {DATE_SHIFT_MILLIS})")
    } else {
        "new java.util.Date()".to_string()
    }
}

fn calendar_initializer(field: &FieldMetadata) -> String {
    let shift = if field.has_annotation(&ann(well_known::PAST)) {
        " - 1"
    } else if field.has_annotation(&ann(well_known::FUTURE)) {
        " + 1"
    } else {
        return "java.util.Calendar.getInstance()".to_string();
    };
    format!(
        "new java.util.GregorianCalendar(\
java.util.Calendar.getInstance().get(java.util.Calendar.YEAR), \
java.util.Calendar.getInstance().get(java.util.Calendar.MONTH), \
java.util.Calendar.getInstance().get(java.util.Calendar.DAY_OF_MONTH){shift})"
    )
}

/// The argument passed to the field's mutator in `getNewTransient<Entity>`.
///
/// Dates are always populated. Every other field is populated only when it is
/// constrained (`@NotNull`, `@Size`, `@Min`, `@Max`) or carries no annotation at all;
/// otherwise it receives `null`. Related entities are appended to `collaborators` in
/// first-seen order.
fn initializer_for(
    field: &FieldMetadata,
    entity: &JavaType,
    collaborators: &mut Vec<JavaType>,
) -> Result<String, MetadataError> {
    let ty = &field.field_type;
    if ty.fully_qualified_name() == well_known::DATE {
        return Ok(date_initializer(field));
    }

    let constrained = [well_known::NOT_NULL, well_known::SIZE, well_known::MIN, well_known::MAX]
        .iter()
        .any(|a| field.has_annotation(&ann(a)));
    if !constrained && !field.annotations.is_empty() {
        return Ok("null".to_string());
    }

    let initializer = match ty.fully_qualified_name() {
        "java.lang.String" => string_initializer(field),
        well_known::CALENDAR => calendar_initializer(field),
        "java.lang.Boolean" => "new Boolean(true)".to_string(),
        "boolean" => "true".to_string(),
        "java.lang.Integer" | "int" => "new Integer(index)".to_string(),
        "java.lang.Double" | "double" => "new Integer(index).doubleValue()".to_string(),
        "java.lang.Float" | "float" => "new Integer(index).floatValue()".to_string(),
        "java.lang.Long" | "long" => "new Integer(index).longValue()".to_string(),
        "java.lang.Short" | "short" => "new Integer(index).shortValue()".to_string(),
        _ => relationship_or_enum_initializer(field, entity, collaborators),
    };
    Ok(initializer)
}

fn relationship_or_enum_initializer(
    field: &FieldMetadata,
    entity: &JavaType,
    collaborators: &mut Vec<JavaType>,
) -> String {
    let ty = &field.field_type;
    let one_to_one = field.has_annotation(&ann(well_known::ONE_TO_ONE));

    if one_to_one || field.has_annotation(&ann(well_known::MANY_TO_ONE)) {
        if ty == entity {
            return "obj".to_string();
        }
        if !collaborators.contains(ty) {
            collaborators.push(ty.clone());
        }
        let accessor = if one_to_one {
            format!("getSpecific{}(index)", ty.simple_name())
        } else {
            format!("getRandom{}()", ty.simple_name())
        };
        return format!("{}.{accessor}", collaborator_field_name(ty));
    }

    if field.has_annotation(&ann(well_known::ENUMERATED)) {
        return format!("{}.class.getEnumConstants()[0]", ty.fully_qualified_name());
    }
    "null".to_string()
}

fn symbol(name: String) -> Result<JavaSymbolName, MetadataError> {
    JavaSymbolName::new(name)
}

fn new_transient_method(names: &Names<'_>, properties: &[Property]) -> Result<MethodMetadata, MetadataError> {
    let fqn = names.entity.fully_qualified_name();
    let mut body = InvocableMemberBodyBuilder::new();
    body.append_formal_line(format!("{fqn} obj = new {fqn}();"));
    for property in properties {
        match property.clamp {
            Some(max) => {
                let var = &property.field;
                body.append_formal_line(format!("String {var} = {};", property.initializer));
                body.append_formal_line(format!("if ({var}.length() > {max}) {{"));
                body.indent();
                body.append_formal_line(format!("{var} = {var}.substring(0, {max});"));
                body.indent_remove();
                body.append_formal_line("}");
                body.append_formal_line(format!("obj.{}({var});", property.mutator));
            }
            None => {
                body.append_formal_line(format!("obj.{}({});", property.mutator, property.initializer));
            }
        }
    }
    body.append_formal_line("return obj;");

    Ok(MethodMetadata::new(symbol(format!("getNewTransient{}", names.simple))?, names.entity.clone())
        .with_parameter(symbol("index".to_string())?, JavaType::int_primitive())
        .with_body(body.output()))
}

fn fetch_lines(body: &mut InvocableMemberBodyBuilder, names: &Names<'_>, pick: &str) {
    let fqn = names.entity.fully_qualified_name();
    body.append_formal_line(format!("{fqn} obj = {}.get({pick});", names.data));
    body.append_formal_line(format!(
        "return {fqn}.find{}(obj.{}());",
        names.simple, names.id_accessor
    ));
}

fn specific_method(names: &Names<'_>) -> Result<MethodMetadata, MetadataError> {
    let mut body = InvocableMemberBodyBuilder::new();
    body.append_formal_line("init();");
    body.append_formal_line("if (index < 0) index = 0;");
    body.append_formal_line(format!(
        "if (index > ({0}.size() - 1)) index = {0}.size() - 1;",
        names.data
    ));
    fetch_lines(&mut body, names, "index");

    Ok(MethodMetadata::new(symbol(format!("getSpecific{}", names.simple))?, names.entity.clone())
        .with_parameter(symbol("index".to_string())?, JavaType::int_primitive())
        .with_body(body.output()))
}

fn random_method(names: &Names<'_>) -> Result<MethodMetadata, MetadataError> {
    let mut body = InvocableMemberBodyBuilder::new();
    body.append_formal_line("init();");
    fetch_lines(&mut body, names, &format!("{}.nextInt({}.size())", names.rnd, names.data));

    Ok(MethodMetadata::new(symbol(format!("getRandom{}", names.simple))?, names.entity.clone())
        .with_body(body.output()))
}

fn modify_method(names: &Names<'_>) -> Result<MethodMetadata, MetadataError> {
    let mut body = InvocableMemberBodyBuilder::new();
    body.append_formal_line("return false;");

    Ok(MethodMetadata::new(symbol(format!("modify{}", names.simple))?, JavaType::boolean_primitive())
        .with_parameter(symbol("obj".to_string())?, names.entity.clone())
        .with_body(body.output()))
}

fn init_method(names: &Names<'_>) -> Result<MethodMetadata, MetadataError> {
    let fqn = names.entity.fully_qualified_name();
    let data = &names.data;
    let quantity = names.quantity;

    let mut body = InvocableMemberBodyBuilder::new();
    body.append_formal_line(format!("if ({data} != null) {{"));
    body.indent();
    body.append_formal_line("return;");
    body.indent_remove();
    body.append_formal_line("}");
    body.append_formal_line("");
    body.append_formal_line(format!("{data} = {fqn}.find{}Entries(0, {quantity});", names.simple));
    body.append_formal_line(format!(
        "if ({data} == null) throw new IllegalStateException(\"Find entries implementation for '{}' illegally returned null\");",
        names.simple
    ));
    body.append_formal_line(format!("if ({data}.size() > 0) {{"));
    body.indent();
    body.append_formal_line("return;");
    body.indent_remove();
    body.append_formal_line("}");
    body.append_formal_line("");
    body.append_formal_line(format!("{data} = new java.util.ArrayList<{fqn}>();"));
    body.append_formal_line(format!("for (int i = 0; i < {quantity}; i++) {{"));
    body.indent();
    body.append_formal_line(format!("{fqn} obj = getNewTransient{}(i);", names.simple));
    body.append_formal_line("obj.persist();");
    body.append_formal_line(format!("{data}.add(obj);"));
    body.indent_remove();
    body.append_formal_line("}");

    let transactional = AnnotationMetadata::marker(ann(well_known::TRANSACTIONAL)).with_attribute(
        symbol("propagation".to_string())?,
        AnnotationAttributeValue::Enum {
            enum_type: ann(well_known::PROPAGATION),
            constant: symbol("REQUIRES_NEW".to_string())?,
        },
    );

    Ok(MethodMetadata::new(symbol("init".to_string())?, JavaType::void_primitive())
        .with_annotation(transactional)
        .with_body(body.output()))
}
