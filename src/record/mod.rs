//! Record descriptors
//!
//! Source rows and destination records describe themselves through traits
//! instead of runtime reflection:
//!
//! - `SourceRow`: ordered field list (name, tag, Rust type) and indexed value access
//! - `Record`: ordered field list (scalar types or relation element types),
//!   default construction and by-name field assignment
//!
//! The `source_row!` and `record!` macros generate both impls from a plain
//! struct definition.

mod macros;
mod value;

pub use value::{GroupKey, Scalar, ScalarType, Value, ValueKind};

use std::any::{Any, TypeId};

use crate::errors::{MapError, MapResult};

/// A field of a source row type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceField {
    /// Rust field name
    pub name: &'static str,
    /// Raw mapping tag, `None` if the field is not mapped
    pub tag: Option<&'static str>,
    /// Rust type of the field
    pub ty: ScalarType,
}

impl SourceField {
    pub fn new(name: &'static str, tag: Option<&'static str>, ty: ScalarType) -> Self {
        Self { name, tag, ty }
    }
}

/// A flat row produced by a relational join.
///
/// `fields()` must list every field in declaration order; `value(i)` returns
/// the value of the i-th listed field.
pub trait SourceRow: Send + Sync + 'static {
    fn fields() -> Vec<SourceField>;

    fn value(&self, index: usize) -> Option<Value>;
}

/// Shape of a destination field
#[derive(Debug, Clone, Copy)]
pub enum FieldShape {
    /// Leaf value of the given Rust type
    Scalar(ScalarType),
    /// Ordered collection of nested records
    Relation(fn() -> RecordType),
}

/// A field of a destination record type
#[derive(Debug, Clone)]
pub struct RecordField {
    pub name: &'static str,
    pub shape: FieldShape,
}

impl RecordField {
    pub fn scalar(name: &'static str, ty: ScalarType) -> Self {
        Self {
            name,
            shape: FieldShape::Scalar(ty),
        }
    }

    pub fn relation(name: &'static str, element: fn() -> RecordType) -> Self {
        Self {
            name,
            shape: FieldShape::Relation(element),
        }
    }
}

/// Data written into a destination field
pub enum FieldData {
    Value(Value),
    Records(Vec<Box<dyn Any + Send>>),
}

impl std::fmt::Debug for FieldData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldData::Value(v) => f.debug_tuple("Value").field(v).finish(),
            FieldData::Records(r) => write!(f, "Records(<{} records>)", r.len()),
        }
    }
}

/// A nested output record.
///
/// Relation fields are `Vec<Child>` where `Child: Record`.
pub trait Record: Default + Send + 'static {
    /// Name used in error messages
    fn name() -> &'static str {
        short_type_name::<Self>()
    }

    fn fields() -> Vec<RecordField>;

    fn set_field(&mut self, field: &str, data: FieldData) -> MapResult<()>;
}

/// Type-erased record used while grouping
pub trait ErasedRecord: Send {
    fn assign(&mut self, field: &str, data: FieldData) -> MapResult<()>;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<R: Record> ErasedRecord for R {
    fn assign(&mut self, field: &str, data: FieldData) -> MapResult<()> {
        self.set_field(field, data)
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

/// Runtime descriptor of a destination record type
#[derive(Debug, Clone)]
pub struct RecordType {
    name: &'static str,
    type_id: TypeId,
    fields: Vec<RecordField>,
    construct: fn() -> Box<dyn ErasedRecord>,
}

impl RecordType {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    /// Finds a field by exact (case-sensitive) name
    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Creates a default-valued instance
    pub fn instantiate(&self) -> Box<dyn ErasedRecord> {
        (self.construct)()
    }
}

/// Builds the descriptor of a record type
pub fn record_type<R: Record>() -> RecordType {
    RecordType {
        name: R::name(),
        type_id: TypeId::of::<R>(),
        fields: R::fields(),
        construct: construct::<R>,
    }
}

fn construct<R: Record>() -> Box<dyn ErasedRecord> {
    Box::new(R::default())
}

/// Last path segment of a type name
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Unpacks a scalar for `Record::set_field` implementations
pub fn take_scalar<T: Scalar>(record: &'static str, field: &str, data: FieldData) -> MapResult<T> {
    match data {
        FieldData::Value(value) => {
            let found = format!("{} value {}", value.kind(), value);
            T::from_value(value).ok_or_else(|| {
                MapError::shape(
                    format!("{}.{}", record, field),
                    format!("expected {}, got {}", std::any::type_name::<T>(), found),
                )
            })
        }
        FieldData::Records(_) => Err(MapError::shape(
            format!("{}.{}", record, field),
            "expected scalar value, got record collection",
        )),
    }
}

/// Unpacks a record collection for `Record::set_field` implementations
pub fn take_records<T: Record>(
    record: &'static str,
    field: &str,
    data: FieldData,
) -> MapResult<Vec<T>> {
    match data {
        FieldData::Records(items) => items
            .into_iter()
            .map(|item| {
                item.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
                    MapError::shape(
                        format!("{}.{}", record, field),
                        format!("collection element is not a {}", T::name()),
                    )
                })
            })
            .collect(),
        FieldData::Value(value) => Err(MapError::shape(
            format!("{}.{}", record, field),
            format!("expected record collection, got {} value", value.kind()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::record! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Pet {
            pub nick_name: String,
            pub age: u32,
        }
    }

    crate::record! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Owner {
            pub id: i64,
        }
        relations {
            pub pets: Pet,
        }
    }

    crate::source_row! {
        #[derive(Debug, Clone)]
        pub struct OwnerPetRow {
            #[tag = "id, pk"]
            pub id: i64,
            #[tag = "pets__nick_name, pk"]
            pub nick: String,
            pub note: String,
        }
    }

    #[test]
    fn test_record_type_descriptor() {
        let owner = record_type::<Owner>();
        assert_eq!(owner.name(), "Owner");
        assert_eq!(owner.type_id(), TypeId::of::<Owner>());
        assert_eq!(owner.fields().len(), 2);
        match owner.field("id").unwrap().shape {
            FieldShape::Scalar(ty) => {
                assert_eq!(ty.kind, ValueKind::Int);
                assert_eq!(ty, ScalarType::of::<i64>());
            }
            FieldShape::Relation(_) => panic!("id should be a scalar"),
        }

        match owner.field("pets").unwrap().shape {
            FieldShape::Relation(element) => assert_eq!(element().name(), "Pet"),
            FieldShape::Scalar(_) => panic!("pets should be a relation"),
        }
    }

    #[test]
    fn test_field_lookup_is_case_sensitive() {
        let owner = record_type::<Owner>();
        assert!(owner.field("Pets").is_none());
        assert!(owner.field("pets").is_some());
    }

    #[test]
    fn test_set_scalar_and_relation() {
        let mut owner = Owner::default();
        owner
            .set_field("id", FieldData::Value(Value::Int(9)))
            .unwrap();

        let pet: Box<dyn Any + Send> = Box::new(Pet {
            nick_name: "rex".into(),
            age: 3,
        });
        owner
            .set_field("pets", FieldData::Records(vec![pet]))
            .unwrap();

        assert_eq!(owner.id, 9);
        assert_eq!(owner.pets.len(), 1);
        assert_eq!(owner.pets[0].nick_name, "rex");
    }

    #[test]
    fn test_set_wrong_kind_is_shape_error() {
        let mut pet = Pet::default();
        let err = pet
            .set_field("age", FieldData::Value(Value::Int(3)))
            .unwrap_err();
        assert!(matches!(err, MapError::Shape { .. }));
    }

    #[test]
    fn test_out_of_range_names_target_type() {
        let err = take_scalar::<i8>("Narrow", "small", FieldData::Value(Value::Int(300)))
            .unwrap_err();
        match err {
            MapError::Shape { path, reason } => {
                assert_eq!(path, "Narrow.small");
                assert_eq!(reason, "expected i8, got int value 300");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_set_unknown_field() {
        let mut pet = Pet::default();
        let err = pet
            .set_field("color", FieldData::Value(Value::Text("red".into())))
            .unwrap_err();
        assert!(matches!(err, MapError::FieldNotFound { .. }));
    }

    #[test]
    fn test_foreign_element_is_shape_error() {
        let mut owner = Owner::default();
        let stray: Box<dyn Any + Send> = Box::new(Owner::default());
        let err = owner
            .set_field("pets", FieldData::Records(vec![stray]))
            .unwrap_err();
        assert!(matches!(err, MapError::Shape { .. }));
    }

    #[test]
    fn test_source_row_descriptor() {
        let fields = OwnerPetRow::fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].tag, Some("id, pk"));
        assert_eq!(fields[1].ty.kind, ValueKind::Text);
        assert_eq!(fields[0].ty, ScalarType::of::<i64>());
        assert_eq!(fields[2].tag, None);

        let row = OwnerPetRow {
            id: 4,
            nick: "rex".into(),
            note: String::new(),
        };
        assert_eq!(row.value(0), Some(Value::Int(4)));
        assert_eq!(row.value(1), Some(Value::Text("rex".into())));
        assert_eq!(row.value(3), None);
    }

    #[test]
    fn test_instantiate_erased() {
        let pet_type = record_type::<Pet>();
        let mut erased = pet_type.instantiate();
        erased
            .assign("nick_name", FieldData::Value(Value::Text("tom".into())))
            .unwrap();

        let pet = erased.into_any().downcast::<Pet>().unwrap();
        assert_eq!(pet.nick_name, "tom");
        assert_eq!(pet.age, 0);
    }
}
