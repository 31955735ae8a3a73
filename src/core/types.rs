use super::{DbError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

const MAX_DATABASE_NAME_LEN: usize = 63;
const MAX_NAMESPACE_LEN: usize = 255;
const INTERNAL_DATABASES: [&str; 3] = ["admin", "local", "config"];

/// Fully qualified collection name, `<db>.<collection>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace {
    db: String,
    coll: String,
}

impl Namespace {
    pub fn new(db: impl Into<String>, coll: impl Into<String>) -> Result<Self> {
        let db = db.into();
        let coll = coll.into();
        Self::validate_db_name(&db)?;
        Self::validate_coll_name(&coll)?;

        if db.len() + 1 + coll.len() > MAX_NAMESPACE_LEN {
            return Err(DbError::InvalidNamespace(format!(
                "Fully qualified namespace is too long. Namespace: {db}.{coll} Max: {MAX_NAMESPACE_LEN}"
            )));
        }

        Ok(Self { db, coll })
    }

    /// Parses `db.collection`; the collection part may itself contain dots.
    pub fn parse(raw: &str) -> Result<Self> {
        let (db, coll) = raw
            .split_once('.')
            .ok_or_else(|| DbError::InvalidNamespace(format!("Invalid namespace specified '{raw}'")))?;
        Self::new(db, coll)
    }

    pub fn db(&self) -> &str {
        &self.db
    }

    pub fn coll(&self) -> &str {
        &self.coll
    }

    pub fn is_on_internal_db(&self) -> bool {
        INTERNAL_DATABASES.contains(&self.db.as_str())
    }

    pub fn is_system(&self) -> bool {
        self.coll.starts_with("system.")
    }

    /// Queryable-encryption state collections: `enxcol_.<name>.esc` / `.ecoc`.
    pub fn is_fle2_state_collection(&self) -> bool {
        self.coll.starts_with("enxcol_.")
            && (self.coll.ends_with(".esc") || self.coll.ends_with(".ecoc"))
    }

    fn validate_db_name(db: &str) -> Result<()> {
        if db.is_empty() {
            return Err(DbError::InvalidNamespace("Database name cannot be empty".into()));
        }
        if db.len() > MAX_DATABASE_NAME_LEN {
            return Err(DbError::InvalidNamespace(format!(
                "Database name is too long: {db}"
            )));
        }
        if let Some(bad) = db.chars().find(|c| matches!(c, '/' | '\\' | '.' | ' ' | '"' | '$' | '\0')) {
            return Err(DbError::InvalidNamespace(format!(
                "Database name '{db}' contains an invalid character '{bad}'"
            )));
        }
        Ok(())
    }

    fn validate_coll_name(coll: &str) -> Result<()> {
        if coll.is_empty() {
            return Err(DbError::InvalidNamespace("Collection name cannot be empty".into()));
        }
        if coll.contains('$') || coll.contains('\0') {
            return Err(DbError::InvalidNamespace(format!(
                "Invalid collection name '{coll}'"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.db, self.coll)
    }
}

impl TryFrom<String> for Namespace {
    type Error = DbError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<Namespace> for String {
    fn from(nss: Namespace) -> Self {
        nss.to_string()
    }
}

/// Identity token of one collection instance. Drop + recreate yields a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionUuid(Uuid);

impl CollectionUuid {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

}

impl fmt::Display for CollectionUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFieldKind {
    Ranged,
    Hashed,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyField {
    pub path: String,
    pub kind: KeyFieldKind,
}

impl KeyField {
    pub fn ranged(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: KeyFieldKind::Ranged,
        }
    }

    pub fn hashed(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: KeyFieldKind::Hashed,
        }
    }
}

/// Candidate shard key: an ordered, non-empty list of field paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShardKeyPattern {
    fields: Vec<KeyField>,
}

impl ShardKeyPattern {
    pub fn new(fields: Vec<KeyField>) -> Result<Self> {
        if fields.is_empty() {
            return Err(DbError::BadValue("The shard key pattern cannot be empty".into()));
        }

        let mut seen: Vec<&str> = Vec::with_capacity(fields.len());
        for field in &fields {
            validate_field_path(&field.path)?;
            if seen.contains(&field.path.as_str()) {
                return Err(DbError::BadValue(format!(
                    "The shard key pattern contains the field '{}' more than once",
                    field.path
                )));
            }
            seen.push(&field.path);
        }

        let hashed = fields.iter().filter(|f| f.kind == KeyFieldKind::Hashed).count();
        if hashed > 1 {
            return Err(DbError::BadValue(
                "The shard key pattern can contain at most one hashed field".into(),
            ));
        }

        Ok(Self { fields })
    }

    /// Ranged key over the given paths, in order.
    pub fn ranged<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(paths.into_iter().map(KeyField::ranged).collect())
    }

    /// Parses `{<path>: 1 | "hashed", ...}` keeping field order.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            DbError::BadValue(format!("The shard key pattern must be an object, got {value}"))
        })?;

        let mut fields = Vec::with_capacity(obj.len());
        for (path, kind) in obj {
            let field = match kind {
                Value::Number(n) if n.as_f64() == Some(1.0) => KeyField::ranged(path.clone()),
                Value::String(s) if s == "hashed" => KeyField::hashed(path.clone()),
                other => {
                    return Err(DbError::BadValue(format!(
                        "Unsupported value {other} for shard key field '{path}'; expected 1 or \"hashed\""
                    )));
                }
            };
            fields.push(field);
        }

        Self::new(fields)
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::with_capacity(self.fields.len());
        for field in &self.fields {
            let kind = match field.kind {
                KeyFieldKind::Ranged => Value::from(1),
                KeyFieldKind::Hashed => Value::from("hashed"),
            };
            obj.insert(field.path.clone(), kind);
        }
        Value::Object(obj)
    }

}

fn validate_field_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DbError::BadValue("Shard key field path cannot be empty".into()));
    }
    for part in path.split('.') {
        if part.is_empty() {
            return Err(DbError::BadValue(format!(
                "Shard key field path '{path}' contains an empty component"
            )));
        }
        if part.starts_with('$') {
            return Err(DbError::BadValue(format!(
                "Shard key field path '{path}' cannot contain a '$'-prefixed component"
            )));
        }
    }
    Ok(())
}

impl fmt::Display for ShardKeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_json().fmt(f)
    }
}

impl Serialize for ShardKeyPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ShardKeyPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}
