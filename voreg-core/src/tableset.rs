//! Table-set description of published data collections.
//!
//! Column names and table names are lowercased on output so quoting clients
//! can match them case-normalized.

use crate::model::vs;
use crate::xml::Node;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct SchemaDef {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub utype: Option<String>,
    pub tables: Vec<TableDef>,
}

#[derive(Debug, Clone, Default)]
pub struct TableDef {
    /// Qualified name (`schema.table`).
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub utype: Option<String>,
    pub nrows: Option<u64>,
    pub columns: Vec<ColumnDef>,
    pub foreign_keys: Vec<ForeignKeyDef>,
}

#[derive(Debug, Clone, Default)]
pub struct ColumnDef {
    pub name: String,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub ucd: Option<String>,
    pub utype: Option<String>,
    /// VOTable type name (`char`, `double`, `long`, ...).
    pub datatype: String,
    pub arraysize: Option<String>,
    pub xtype: Option<String>,
    pub indexed: bool,
    pub primary: bool,
    pub required: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ForeignKeyDef {
    pub target_table: String,
    /// (from column, target column) pairs.
    pub columns: Vec<(String, String)>,
    pub description: Option<String>,
    pub utype: Option<String>,
}

const SIMPLE_TYPES: &[(&str, &str)] = &[
    ("char", "char"),
    ("bytea", "char"),
    ("unicodeChar", "char"),
    ("short", "integer"),
    ("int", "integer"),
    ("long", "integer"),
    ("float", "real"),
    ("double", "real"),
];

/// A `vs:SimpleDataType` node for a VOTable type name; anything unmapped
/// degrades to `char`.
pub fn simple_type(datatype: &str, arraysize: Option<&str>) -> Node {
    let simple = SIMPLE_TYPES
        .iter()
        .find(|(vot, _)| *vot == datatype)
        .map(|(_, s)| *s)
        .unwrap_or("char");
    vs::simple_type()
        .opt_attr("arraysize", arraysize.filter(|a| *a != "1"))
        .with_text(simple)
}

fn votable_type(col: &ColumnDef) -> Node {
    vs::votable_type()
        .opt_attr("arraysize", col.arraysize.as_deref().filter(|a| *a != "1"))
        .opt_attr("extendedType", col.xtype.clone())
        .with_text(&col.datatype)
}

fn column_node(col: &ColumnDef) -> Node {
    let mut flags = Vec::new();
    if col.indexed {
        flags.push("indexed");
    }
    if col.primary {
        flags.push("primary");
    } else if !col.required {
        flags.push("nullable");
    }

    vs::column()
        .with(vs::name().with_text(col.name.to_lowercase()))
        .with(vs::description().with_text(col.description.clone().unwrap_or_default()))
        .with(vs::unit().with_text(col.unit.clone().unwrap_or_default()))
        .with(vs::ucd().with_text(col.ucd.clone().unwrap_or_default()))
        .with(vs::utype().with_text(col.utype.clone().unwrap_or_default()))
        .with(votable_type(col))
        .with(
            flags
                .into_iter()
                .map(|f| vs::flag().with_text(f))
                .collect::<Vec<_>>(),
        )
}

/// Foreign keys pointing outside the described set are suppressed for
/// consistency with what the query layer exposes.
fn foreign_key_node(fk: &ForeignKeyDef, names_in_set: &BTreeSet<String>) -> Option<Node> {
    let target = fk.target_table.to_lowercase();
    if !names_in_set.contains(&target) {
        return None;
    }
    let mut node = vs::foreign_key().with(vs::target_table().with_text(target));
    for (from, to) in &fk.columns {
        node.push(
            vs::fk_column()
                .with(vs::from_column().with_text(from.to_lowercase()))
                .with(vs::target_column().with_text(to.to_lowercase())),
        );
    }
    Some(
        node.with(vs::description().with_text(fk.description.clone().unwrap_or_default()))
            .with(vs::utype().with_text(fk.utype.clone().unwrap_or_default())),
    )
}

fn table_node(table: &TableDef, names_in_set: &BTreeSet<String>) -> Node {
    let mut node = vs::table()
        .with(vs::name().with_text(table.name.to_lowercase()))
        .with(vs::title().with_text(table.title.clone().unwrap_or_default()))
        .with(vs::description().with_text(table.description.clone().unwrap_or_default()))
        .with(vs::utype().with_text(table.utype.clone().unwrap_or_default()))
        .with(vs::nrows().with_text(table.nrows.map(|n| n.to_string()).unwrap_or_default()));
    for col in &table.columns {
        node.push(column_node(col));
    }
    for fk in &table.foreign_keys {
        node.push(foreign_key_node(fk, names_in_set));
    }
    node
}

/// The full table-set element for a sequence of schemas. With no tables at
/// all, a single stub schema named `default` is emitted; the element must
/// not come out empty for resources that are declared to have one.
pub fn table_set(schemas: &[SchemaDef]) -> Node {
    if schemas.iter().all(|s| s.tables.is_empty()) {
        return vs::tableset().with(vs::schema().with(vs::name().with_text("default")));
    }

    let names_in_set: BTreeSet<String> = schemas
        .iter()
        .flat_map(|s| s.tables.iter())
        .map(|t| t.name.to_lowercase())
        .collect();

    let mut node = vs::tableset();
    for schema in schemas {
        let mut schema_node = vs::schema()
            .with(vs::name().with_text(&schema.name))
            .with(vs::title().with_text(schema.title.clone().unwrap_or_default()))
            .with(vs::description().with_text(schema.description.clone().unwrap_or_default()))
            .with(vs::utype().with_text(schema.utype.clone().unwrap_or_default()));
        for table in &schema.tables {
            schema_node.push(table_node(table, &names_in_set));
        }
        node.push(schema_node);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> SchemaDef {
        SchemaDef {
            name: "dr3".to_string(),
            title: Some("Data release 3".to_string()),
            description: None,
            utype: None,
            tables: vec![TableDef {
                name: "dr3.Main".to_string(),
                title: Some("Main catalog".to_string()),
                nrows: Some(120_000),
                columns: vec![
                    ColumnDef {
                        name: "RAJ2000".to_string(),
                        datatype: "double".to_string(),
                        ucd: Some("pos.eq.ra".to_string()),
                        unit: Some("deg".to_string()),
                        indexed: true,
                        required: true,
                        ..Default::default()
                    },
                    ColumnDef {
                        name: "source_id".to_string(),
                        datatype: "long".to_string(),
                        primary: true,
                        required: true,
                        ..Default::default()
                    },
                ],
                foreign_keys: vec![
                    ForeignKeyDef {
                        target_table: "dr3.extras".to_string(),
                        columns: vec![("source_id".to_string(), "source_id".to_string())],
                        ..Default::default()
                    },
                    ForeignKeyDef {
                        target_table: "elsewhere.other".to_string(),
                        columns: vec![("source_id".to_string(), "id".to_string())],
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn names_come_out_lowercased() {
        let mut ts = table_set(&[sample_schema()]);
        ts.finalize();
        let schema = &ts.children()[0];
        let table = schema
            .children()
            .iter()
            .find(|c| c.name() == "table")
            .unwrap();
        let name = table
            .children()
            .iter()
            .find(|c| c.name() == "name")
            .unwrap();
        assert_eq!(name.text().unwrap(), "dr3.main");
    }

    #[test]
    fn foreign_keys_outside_the_set_are_dropped() {
        let mut extras = sample_schema();
        extras.tables.push(TableDef {
            name: "dr3.extras".to_string(),
            columns: vec![ColumnDef {
                name: "source_id".to_string(),
                datatype: "long".to_string(),
                required: true,
                ..Default::default()
            }],
            ..Default::default()
        });
        let mut ts = table_set(&[extras]);
        ts.finalize();
        let table = ts.children()[0]
            .children()
            .iter()
            .find(|c| c.name() == "table")
            .unwrap()
            .clone();
        let fks: Vec<_> = table
            .children()
            .iter()
            .filter(|c| c.name() == "foreignKey")
            .collect();
        // dr3.extras is in the set, elsewhere.other is not
        assert_eq!(fks.len(), 1);
        let target = fks[0]
            .children()
            .iter()
            .find(|c| c.name() == "targetTable")
            .unwrap();
        assert_eq!(target.text().unwrap(), "dr3.extras");
    }

    #[test]
    fn empty_collection_gets_a_default_schema_stub() {
        let mut ts = table_set(&[]);
        ts.finalize();
        assert!(!ts.is_empty());
        assert_eq!(ts.children().len(), 1);
        let name = &ts.children()[0].children()[0];
        assert_eq!(name.text().unwrap(), "default");
    }

    #[test]
    fn column_flags_reflect_indexing_and_nullability() {
        let mut col = column_node(&ColumnDef {
            name: "mag".to_string(),
            datatype: "float".to_string(),
            ..Default::default()
        });
        col.finalize();
        let flags: Vec<_> = col
            .children()
            .iter()
            .filter(|c| c.name() == "flag")
            .map(|c| c.text().unwrap().to_string())
            .collect();
        assert_eq!(flags, ["nullable"]);
    }

    #[test]
    fn simple_types_collapse_to_the_coarse_vocabulary() {
        assert_eq!(simple_type("double", None).text().unwrap(), "real");
        assert_eq!(simple_type("long", None).text().unwrap(), "integer");
        assert_eq!(simple_type("weird", None).text().unwrap(), "char");
    }
}
