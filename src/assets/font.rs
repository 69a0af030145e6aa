use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{ThumbError, ThumbResult};

/// Font face bytes resolved for a style.
#[derive(Clone)]
pub struct LoadedFont {
    /// Family name as reported by the font file.
    pub family: String,
    /// Weight of the resolved face.
    pub weight: u16,
    /// Raw font file bytes (the whole collection for `.ttc` files).
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside `bytes`.
    pub index: u32,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("family", &self.family)
            .field("weight", &self.weight)
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

/// Locates font faces by family and weight.
///
/// Lookups never fall back to another family: a style that names a missing family fails with
/// [`ThumbError::FontLoad`].
#[derive(Clone)]
pub struct FontResolver {
    db: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for FontResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResolver")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl Default for FontResolver {
    fn default() -> Self {
        Self::system()
    }
}

impl FontResolver {
    /// Resolver with no fonts at all.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(usvg::fontdb::Database::new()),
        }
    }

    /// Resolver over the platform's installed fonts.
    pub fn system() -> Self {
        Self::with_dirs(std::iter::empty::<PathBuf>())
    }

    /// Resolver over installed fonts plus every `.ttf`/`.otf`/`.ttc` in `dirs`.
    pub fn with_dirs<P: AsRef<Path>>(dirs: impl IntoIterator<Item = P>) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in dirs {
            load_fonts_from_dir(&mut db, dir.as_ref());
        }
        tracing::debug!(faces = db.len(), "font database ready");
        Self { db: Arc::new(db) }
    }

    /// Register an in-memory font file.
    pub fn add_font_data(&mut self, bytes: Vec<u8>) {
        Arc::make_mut(&mut self.db).load_font_data(bytes);
    }

    /// Register every font file found directly inside `dir`.
    pub fn add_dir(&mut self, dir: impl AsRef<Path>) {
        load_fonts_from_dir(Arc::make_mut(&mut self.db), dir.as_ref());
    }

    /// Distinct family names known to the resolver, sorted.
    pub fn families(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .db
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Resolve the face of `family` closest to `weight` and load its bytes.
    pub fn resolve(&self, family: &str, weight: u16) -> ThumbResult<LoadedFont> {
        let families = [usvg::fontdb::Family::Name(family)];
        let query = usvg::fontdb::Query {
            families: &families,
            weight: usvg::fontdb::Weight(weight),
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };
        let id = self.db.query(&query).ok_or_else(|| {
            ThumbError::font_load(family, weight, "family is not installed or configured")
        })?;
        let face = self
            .db
            .face(id)
            .ok_or_else(|| ThumbError::font_load(family, weight, "face vanished from database"))?;

        let resolved_family = face
            .families
            .iter()
            .map(|(name, _)| name.as_str())
            .find(|name| name.eq_ignore_ascii_case(family))
            .ok_or_else(|| {
                ThumbError::font_load(
                    family,
                    weight,
                    "database offered a face from a different family",
                )
            })?
            .to_string();
        let resolved_weight = face.weight.0;
        if resolved_weight != weight {
            tracing::warn!(
                family,
                requested = weight,
                resolved = resolved_weight,
                "using nearest available weight"
            );
        }

        let (bytes, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| ThumbError::font_load(family, weight, "font file is unreadable"))?;

        Ok(LoadedFont {
            family: resolved_family,
            weight: resolved_weight,
            bytes: Arc::new(bytes),
            index,
        })
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font file");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
