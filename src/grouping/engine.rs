//! Recursive grouping of flat rows into nested records

use std::any::Any;
use std::collections::HashMap;

use crate::errors::{MapError, MapResult};
use crate::record::{ErasedRecord, FieldData, GroupKey, SourceRow};
use crate::schema::Schema;

/// One distinct entity at a level, plus the raw rows of each relation
struct Group<'r, S> {
    element: Box<dyn ErasedRecord>,
    buckets: Vec<Vec<&'r S>>,
}

/// Groups `rows` according to `schema` and returns the built elements in
/// first-occurrence order of their primary keys.
///
/// Rows whose key equals the level's zero value are skipped at this level.
/// Every row of a group is forwarded to every relation bucket; each child
/// level filters its own zero-keyed rows.
pub fn group_rows<'r, S: SourceRow>(
    schema: &Schema,
    rows: &[&'r S],
) -> MapResult<Vec<Box<dyn Any + Send>>> {
    let relation_count = schema.relations().len();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Group<'r, S>> = Vec::new();

    for &row in rows {
        let key = match key_of(schema, row)? {
            Some(key) => key,
            None => continue,
        };

        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                groups.push(Group {
                    element: new_element(schema, row)?,
                    buckets: (0..relation_count).map(|_| Vec::new()).collect(),
                });
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };

        for bucket in &mut groups[slot].buckets {
            bucket.push(row);
        }
    }

    let mut elements = Vec::with_capacity(groups.len());
    for Group {
        mut element,
        buckets,
    } in groups
    {
        for (relation, bucket) in schema.relations().iter().zip(buckets) {
            let children = group_rows(&relation.schema, &bucket)?;
            element.assign(&relation.name, FieldData::Records(children))?;
        }
        elements.push(element.into_any());
    }

    Ok(elements)
}

/// Reads the primary key of `row`; `None` means the row holds no entity
/// at this level.
fn key_of<S: SourceRow>(schema: &Schema, row: &S) -> MapResult<Option<GroupKey>> {
    let record = schema.element().name();
    let pk = schema.primary_key().ok_or_else(|| {
        MapError::internal(format!("no primary key declared for level '{}'", record))
    })?;

    let value = row.value(pk.index).ok_or_else(|| {
        MapError::internal(format!(
            "source row has no value at index {} ('{}')",
            pk.index, pk.field
        ))
    })?;

    if value.kind() != pk.zero.kind() {
        return Err(MapError::shape(
            format!("{}.{}", record, pk.field),
            format!(
                "primary key declared as {} but row holds {}",
                pk.zero.kind(),
                value.kind()
            ),
        ));
    }

    // A zero key cannot be told apart from an outer-join miss; both skip.
    if value == pk.zero {
        return Ok(None);
    }

    Ok(Some(GroupKey::new(value)))
}

/// Builds the element for a newly seen key from the row that introduced it
fn new_element<S: SourceRow>(schema: &Schema, row: &S) -> MapResult<Box<dyn ErasedRecord>> {
    let mut element = schema.element().instantiate();

    for mapping in schema.scalars() {
        let value = row.value(mapping.source_index).ok_or_else(|| {
            MapError::internal(format!(
                "source row has no value at index {} ('{}')",
                mapping.source_index, mapping.source_field
            ))
        })?;
        element.assign(&mapping.destination, FieldData::Value(value))?;
    }

    for relation in schema.relations() {
        element.assign(&relation.name, FieldData::Records(Vec::new()))?;
    }

    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::take_records;
    use crate::schema::SchemaCache;

    crate::record! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Line {
            pub sku: String,
            pub qty: u32,
        }
    }

    crate::record! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Order {
            pub id: i64,
            pub customer: String,
        }
        relations {
            pub lines: Line,
        }
    }

    crate::source_row! {
        pub struct OrderLineRow {
            #[tag = "id, pk"]
            pub id: i64,
            #[tag = "customer"]
            pub customer: String,
            #[tag = "lines__sku, pk"]
            pub sku: String,
            #[tag = "lines__qty"]
            pub qty: u32,
        }
    }

    crate::source_row! {
        pub struct KeylessRow {
            #[tag = "customer"]
            pub customer: String,
        }
    }

    fn row(id: i64, customer: &str, sku: &str, qty: u32) -> OrderLineRow {
        OrderLineRow {
            id,
            customer: customer.to_string(),
            sku: sku.to_string(),
            qty,
        }
    }

    fn run<S: SourceRow, R: crate::record::Record>(rows: &[S]) -> MapResult<Vec<R>> {
        let cache = SchemaCache::new();
        let schema = cache.get_or_build::<S, R>()?;
        let refs: Vec<&S> = rows.iter().collect();
        let elements = group_rows(&schema, &refs)?;
        take_records::<R>(R::name(), "*", FieldData::Records(elements))
    }

    #[test]
    fn test_first_occurrence_order() {
        let rows = vec![
            row(2, "b", "x", 1),
            row(2, "b", "y", 1),
            row(2, "b", "z", 1),
            row(1, "a", "x", 1),
            row(1, "a", "y", 1),
            row(1, "a", "z", 1),
        ];

        let orders: Vec<Order> = run(&rows).unwrap();
        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_children_deduplicated() {
        let rows = vec![
            row(1, "a", "x", 1),
            row(1, "a", "y", 2),
            row(1, "a", "x", 9),
        ];

        let orders: Vec<Order> = run(&rows).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].lines.len(), 2);
        // The first row of a group wins.
        assert_eq!(orders[0].lines[0].qty, 1);
        assert_eq!(orders[0].lines[1].sku, "y");
    }

    #[test]
    fn test_zero_child_key_yields_empty_relation() {
        let rows = vec![row(1, "a", "", 0), row(1, "a", "", 0)];

        let orders: Vec<Order> = run(&rows).unwrap();
        assert_eq!(orders.len(), 1);
        assert!(orders[0].lines.is_empty());
    }

    #[test]
    fn test_zero_parent_key_skips_row() {
        let rows = vec![row(0, "ghost", "x", 1), row(3, "c", "x", 1)];

        let orders: Vec<Order> = run(&rows).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, 3);
    }

    #[test]
    fn test_empty_input() {
        let orders: Vec<Order> = run::<OrderLineRow, Order>(&[]).unwrap();
        assert!(orders.is_empty());
    }

    #[test]
    fn test_keyless_level_fails_when_rows_present() {
        let err = run::<KeylessRow, Order>(&[KeylessRow {
            customer: "a".into(),
        }])
        .unwrap_err();
        assert!(matches!(err, MapError::Internal(_)));

        let empty: Vec<Order> = run::<KeylessRow, Order>(&[]).unwrap();
        assert!(empty.is_empty());
    }
}
