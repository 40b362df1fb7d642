use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use macroquad::{
    color::WHITE,
    math::Vec2 as MacroquadVec2,
    texture::{self, DrawTextureParams, Texture2D},
};
use tower_mini_core::EnemyKind;
use tower_mini_rendering::Rect;
use tracing::{debug, warn};

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
pub(crate) const ALL_SPRITE_KEYS: [SpriteKey; 4] = [
    SpriteKey::Fast,
    SpriteKey::Tank,
    SpriteKey::Tower,
    SpriteKey::Background,
];

/// Images the field can be drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum SpriteKey {
    Fast,
    Tank,
    Tower,
    Background,
}

impl SpriteKey {
    pub(crate) const fn for_enemy(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Fast => Self::Fast,
            EnemyKind::Tank => Self::Tank,
        }
    }
}

/// Cache of textures loaded from the sprite manifest.
///
/// Every sprite is optional. A texture that fails to load is logged and left
/// out, and the renderer draws the primitive fallback for that key.
#[derive(Debug, Default)]
pub(crate) struct SpriteAtlas {
    textures: HashMap<SpriteKey, Texture2D>,
}

impl SpriteAtlas {
    /// Loads sprites from the manifest located at the provided path.
    pub(crate) fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Returns the default manifest path relative to the working directory.
    pub(crate) fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Returns whether the atlas contains the provided key.
    pub(crate) fn contains(&self, key: SpriteKey) -> bool {
        self.textures.contains_key(&key)
    }

    /// Returns the number of textures stored in the atlas.
    pub(crate) fn len(&self) -> usize {
        self.textures.len()
    }

    /// Draws the sprite as a square of edge `size` centred on `center`.
    ///
    /// Returns false when the sprite is not loaded so the caller can fall back.
    pub(crate) fn draw_centered(&self, key: SpriteKey, center: Vec2, size: f32) -> bool {
        let half = size * 0.5;
        self.draw_rect(
            key,
            Rect {
                origin: center - Vec2::splat(half),
                size: Vec2::splat(size),
            },
        )
    }

    /// Draws the background scaled to cover the whole window.
    pub(crate) fn draw_background(&self, window: Vec2) -> bool {
        let Some(texture) = self.textures.get(&SpriteKey::Background) else {
            return false;
        };
        let texture_size = Vec2::new(texture.width(), texture.height());
        match cover_rect(texture_size, window) {
            Some(rect) => self.draw_rect(SpriteKey::Background, rect),
            None => false,
        }
    }

    fn draw_rect(&self, key: SpriteKey, rect: Rect) -> bool {
        let Some(texture) = self.textures.get(&key).copied() else {
            return false;
        };

        let params = DrawTextureParams {
            dest_size: Some(MacroquadVec2::new(rect.size.x, rect.size.y)),
            ..DrawTextureParams::default()
        };
        texture::draw_texture_ex(texture, rect.origin.x, rect.origin.y, WHITE, params);
        true
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Ok(Self::from_entries(entries, &mut loader))
    }

    fn from_entries(
        entries: Vec<(SpriteKey, PathBuf)>,
        loader: &mut impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Self {
        let mut textures = HashMap::with_capacity(entries.len());
        for (key, path) in entries {
            match loader(key, &path) {
                Ok(texture) => {
                    debug!(?key, path = %path.display(), "loaded sprite");
                    let _ = textures.insert(key, texture);
                }
                Err(error) => {
                    warn!(?key, "sprite unavailable, drawing primitives instead: {error:#}");
                }
            }
        }
        Self { textures }
    }
}

fn default_loader(_key: SpriteKey, path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    Ok(Texture2D::from_file_with_format(&bytes, None))
}

/// Rectangle that covers `window` with a texture of `texture_size`,
/// preserving aspect ratio and centring the overflow.
pub(crate) fn cover_rect(texture_size: Vec2, window: Vec2) -> Option<Rect> {
    if texture_size.x <= 0.0 || texture_size.y <= 0.0 {
        return None;
    }
    let scale = (window.x / texture_size.x).max(window.y / texture_size.y);
    let size = texture_size * scale;
    Some(Rect {
        origin: (window - size) * 0.5,
        size,
    })
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    sprites: HashMap<String, String>,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(SpriteKey, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.sprites {
        let key = parse_sprite_key(&name)
            .with_context(|| format!("unknown sprite key `{name}` in manifest"))?;
        if resolved.insert(key, base_path.join(relative_path)).is_some() {
            bail!("sprite manifest contains duplicate entry for {key:?}");
        }
    }

    Ok(ALL_SPRITE_KEYS
        .iter()
        .filter_map(|key| resolved.remove(key).map(|path| (*key, path)))
        .collect())
}

fn parse_sprite_key(name: &str) -> Result<SpriteKey> {
    match name {
        "Fast" => Ok(SpriteKey::Fast),
        "Tank" => Ok(SpriteKey::Tank),
        "Tower" => Ok(SpriteKey::Tower),
        "Background" => Ok(SpriteKey::Background),
        _ => bail!("unknown sprite key `{name}`"),
    }
}
