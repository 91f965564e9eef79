use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const LABEL_NAME_MAX_LEN: usize = 160;

const LABEL_COLUMNS: &str = "uid, slug, name, priority, favorite, description, notes, photo_count, created_at, updated_at";

/// 标签实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Label {
    #[serde(rename = "UID")]
    pub uid: String,
    pub slug: String,
    pub name: String,
    pub priority: i64,
    pub favorite: bool,
    pub description: String,
    pub notes: String,
    pub photo_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Label {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            slug: row.get(1)?,
            name: row.get(2)?,
            priority: row.get(3)?,
            favorite: row.get(4)?,
            description: row.get(5)?,
            notes: row.get(6)?,
            photo_count: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

/// 可编辑的标签字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LabelForm {
    pub name: String,
    pub priority: i64,
    pub favorite: bool,
    pub description: String,
    pub notes: String,
}

impl From<&Label> for LabelForm {
    fn from(label: &Label) -> Self {
        Self {
            name: label.name.clone(),
            priority: label.priority,
            favorite: label.favorite,
            description: label.description.clone(),
            notes: label.notes.clone(),
        }
    }
}

/// 请求体中出现的字段覆盖到表单上，缺省字段保持原值
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LabelFormPatch {
    pub name: Option<String>,
    pub priority: Option<i64>,
    pub favorite: Option<bool>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

impl LabelForm {
    pub fn apply(&mut self, patch: LabelFormPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(favorite) = patch.favorite {
            self.favorite = favorite;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
    }
}

/// 生成 URL 友好的标识：小写 ASCII 字母数字，其余字符段折叠为 `-`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn clip_name(name: &str) -> anyhow::Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow::anyhow!("Label name must not be empty"));
    }
    Ok(name.chars().take(LABEL_NAME_MAX_LEN).collect())
}

fn slug_for(name: &str, uid: &str) -> String {
    let slug = slugify(name);
    if slug.is_empty() {
        uid.to_string()
    } else {
        slug
    }
}

pub(crate) fn new_uid(prefix: char) -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("{}{}", prefix, &raw[..15])
}

pub(crate) fn create_label(
    pool: &Pool<SqliteConnectionManager>,
    name: &str,
    priority: i64,
) -> anyhow::Result<Label> {
    let name = clip_name(name)?;
    let uid = new_uid('l');
    let slug = slug_for(&name, &uid);

    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO labels (uid, slug, name, priority) VALUES (?1, ?2, ?3, ?4)",
        params![uid, slug, name, priority],
    )
    .map_err(|e| anyhow::anyhow!("Failed to create label '{}': {}", name, e))?;
    drop(conn);

    label_by_uid(pool, &uid)?.ok_or_else(|| anyhow::anyhow!("Label {} vanished after insert", uid))
}

pub(crate) fn label_by_uid(
    pool: &Pool<SqliteConnectionManager>,
    uid: &str,
) -> anyhow::Result<Option<Label>> {
    let conn = pool.get()?;
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {} FROM labels WHERE uid = ?1", LABEL_COLUMNS))?;
    Ok(stmt.query_row(params![uid], Label::from_row).optional()?)
}

pub(crate) fn list_labels(
    pool: &Pool<SqliteConnectionManager>,
    count: i64,
    offset: i64,
) -> anyhow::Result<Vec<Label>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM labels ORDER BY favorite DESC, priority DESC, name ASC LIMIT ?1 OFFSET ?2",
        LABEL_COLUMNS
    ))?;
    let rows = stmt.query_map(params![count, offset.max(0)], Label::from_row)?;

    let mut results = Vec::new();
    for label in rows {
        results.push(label?);
    }
    Ok(results)
}

/// 保存表单；名称变化时同步更新 slug
pub(crate) fn save_form(
    pool: &Pool<SqliteConnectionManager>,
    uid: &str,
    form: &LabelForm,
) -> anyhow::Result<Label> {
    let name = clip_name(&form.name)?;
    let slug = slug_for(&name, uid);

    let conn = pool.get()?;
    let affected = conn.execute(
        "UPDATE labels
         SET name = ?2, slug = ?3, priority = ?4, favorite = ?5,
             description = ?6, notes = ?7, updated_at = datetime('now')
         WHERE uid = ?1",
        params![
            uid,
            name,
            slug,
            form.priority,
            form.favorite,
            form.description,
            form.notes
        ],
    )?;
    drop(conn);

    if affected == 0 {
        return Err(anyhow::anyhow!("Label not found: {}", uid));
    }

    label_by_uid(pool, uid)?.ok_or_else(|| anyhow::anyhow!("Label not found: {}", uid))
}

pub(crate) fn set_favorite(
    pool: &Pool<SqliteConnectionManager>,
    uid: &str,
    favorite: bool,
) -> anyhow::Result<usize> {
    let conn = pool.get()?;
    Ok(conn.execute(
        "UPDATE labels SET favorite = ?2, updated_at = datetime('now') WHERE uid = ?1",
        params![uid, favorite],
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Sunset & Beach"), "sunset-beach");
        assert_eq!(slugify("  --Cat--  "), "cat");
        assert_eq!(slugify("Ölfeld 2021"), "lfeld-2021");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn patch_only_overrides_present_fields() {
        let mut form = LabelForm {
            name: "Cat".to_string(),
            priority: 1,
            favorite: false,
            description: "pets".to_string(),
            notes: String::new(),
        };
        let patch: LabelFormPatch =
            serde_json::from_str(r#"{"Name":"Kitten","Favorite":true,"Unknown":1}"#).unwrap();
        form.apply(patch);

        assert_eq!(form.name, "Kitten");
        assert!(form.favorite);
        assert_eq!(form.priority, 1);
        assert_eq!(form.description, "pets");
    }

    #[test]
    fn clip_name_rejects_blank() {
        assert!(clip_name("   ").is_err());
        assert_eq!(clip_name(&"x".repeat(200)).unwrap().len(), LABEL_NAME_MAX_LEN);
    }

    #[test]
    fn uid_has_prefix_and_length() {
        let uid = new_uid('l');
        assert!(uid.starts_with('l'));
        assert_eq!(uid.len(), 16);
    }
}
