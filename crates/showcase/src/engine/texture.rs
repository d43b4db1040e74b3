use bitflags::bitflags;

use super::{lookup, Engine, EngineError, RenderTargetId, TextureId};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u8 {
        const COLOR_ATTACHMENT = 1 << 0;
        const DEPTH_ATTACHMENT = 1 << 1;
        const SAMPLEABLE = 1 << 2;
        const UPLOADABLE = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextureFormat {
    #[default]
    Rgba8,
    Depth24,
}

impl TextureFormat {
    pub fn is_depth(self) -> bool {
        matches!(self, TextureFormat::Depth24)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
    levels: u8,
    usage: TextureUsage,
    format: TextureFormat,
}

impl Texture {
    pub fn builder() -> TextureBuilder {
        TextureBuilder::default()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn levels(&self) -> u8 {
        self.levels
    }

    pub fn usage(&self) -> TextureUsage {
        self.usage
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }
}

#[derive(Debug, Clone)]
pub struct TextureBuilder {
    width: u32,
    height: u32,
    levels: u8,
    usage: TextureUsage,
    format: TextureFormat,
}

impl Default for TextureBuilder {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            levels: 1,
            usage: TextureUsage::SAMPLEABLE,
            format: TextureFormat::Rgba8,
        }
    }
}

impl TextureBuilder {
    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn levels(mut self, levels: u8) -> Self {
        self.levels = levels;
        self
    }

    pub fn usage(mut self, usage: TextureUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }

    pub fn build(self, engine: &mut Engine) -> Result<TextureId, EngineError> {
        let invalid = |reason: String| EngineError::InvalidBuilder {
            what: "texture",
            reason,
        };

        if self.width == 0 || self.height == 0 {
            return Err(invalid(format!("empty extent {}x{}", self.width, self.height)));
        }
        let max_levels = u32::BITS - self.width.max(self.height).leading_zeros();
        if self.levels == 0 || u32::from(self.levels) > max_levels {
            return Err(invalid(format!(
                "{} levels requested, {}x{} allows 1 to {max_levels}",
                self.levels, self.width, self.height
            )));
        }
        if self.usage.contains(TextureUsage::COLOR_ATTACHMENT) && self.format.is_depth() {
            return Err(invalid("depth format used as a colour attachment".into()));
        }
        if self.usage.contains(TextureUsage::DEPTH_ATTACHMENT) && !self.format.is_depth() {
            return Err(invalid(format!("{:?} used as a depth attachment", self.format)));
        }

        let id = TextureId(engine.next_id());
        engine.textures.insert(
            id,
            Texture {
                width: self.width,
                height: self.height,
                levels: self.levels,
                usage: self.usage,
                format: self.format,
            },
        );
        Ok(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentPoint {
    Color,
    Depth,
}

impl AttachmentPoint {
    fn required_usage(self) -> TextureUsage {
        match self {
            AttachmentPoint::Color => TextureUsage::COLOR_ATTACHMENT,
            AttachmentPoint::Depth => TextureUsage::DEPTH_ATTACHMENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget {
    color: Option<TextureId>,
    depth: Option<TextureId>,
}

impl RenderTarget {
    pub fn builder() -> RenderTargetBuilder {
        RenderTargetBuilder::default()
    }

    pub fn attachment(&self, point: AttachmentPoint) -> Option<TextureId> {
        match point {
            AttachmentPoint::Color => self.color,
            AttachmentPoint::Depth => self.depth,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderTargetBuilder {
    color: Option<TextureId>,
    depth: Option<TextureId>,
}

impl RenderTargetBuilder {
    pub fn texture(mut self, point: AttachmentPoint, texture: TextureId) -> Self {
        match point {
            AttachmentPoint::Color => self.color = Some(texture),
            AttachmentPoint::Depth => self.depth = Some(texture),
        }
        self
    }

    pub fn build(self, engine: &mut Engine) -> Result<RenderTargetId, EngineError> {
        let invalid = |reason: String| EngineError::InvalidBuilder {
            what: "render target",
            reason,
        };

        let mut extent = None;
        for (point, texture) in [
            (AttachmentPoint::Color, self.color),
            (AttachmentPoint::Depth, self.depth),
        ] {
            let Some(texture) = texture else { continue };
            let desc = lookup(&engine.textures, texture)?;
            if !desc.usage.contains(point.required_usage()) {
                return Err(invalid(format!(
                    "texture {} attached as {point:?} lacks {:?}",
                    texture.0,
                    point.required_usage()
                )));
            }
            match extent {
                None => extent = Some((desc.width, desc.height)),
                Some(e) if e != (desc.width, desc.height) => {
                    return Err(invalid("attachments differ in size".into()))
                }
                Some(_) => {}
            }
        }
        if extent.is_none() {
            return Err(invalid("no attachment".into()));
        }

        let id = RenderTargetId(engine.next_id());
        engine.render_targets.insert(
            id,
            RenderTarget {
                color: self.color,
                depth: self.depth,
            },
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(engine: &mut Engine, format: TextureFormat, usage: TextureUsage) -> TextureId {
        Texture::builder()
            .width(64)
            .height(32)
            .levels(1)
            .format(format)
            .usage(usage | TextureUsage::SAMPLEABLE)
            .build(engine)
            .unwrap()
    }

    #[test]
    fn texture_validation() {
        let mut engine = Engine::default();
        let levels = Texture::builder().width(8).height(8).levels(5).build(&mut engine);
        assert!(levels.is_err());
        let levels = Texture::builder().width(8).height(8).levels(4).build(&mut engine);
        assert_eq!(engine.texture(levels.unwrap()).unwrap().levels(), 4);

        let depth_as_color = Texture::builder()
            .format(TextureFormat::Depth24)
            .usage(TextureUsage::COLOR_ATTACHMENT)
            .build(&mut engine);
        assert!(depth_as_color.is_err());
    }

    #[test]
    fn render_target_attachments() {
        let mut engine = Engine::default();
        let color = attachment(&mut engine, TextureFormat::Rgba8, TextureUsage::COLOR_ATTACHMENT);
        let depth = attachment(&mut engine, TextureFormat::Depth24, TextureUsage::DEPTH_ATTACHMENT);

        let rt = RenderTarget::builder()
            .texture(AttachmentPoint::Color, color)
            .texture(AttachmentPoint::Depth, depth)
            .build(&mut engine)
            .unwrap();
        let rt = engine.render_target(rt).unwrap();
        assert_eq!(rt.attachment(AttachmentPoint::Color), Some(color));
        assert_eq!(rt.attachment(AttachmentPoint::Depth), Some(depth));

        let swapped = RenderTarget::builder()
            .texture(AttachmentPoint::Color, depth)
            .build(&mut engine);
        assert!(matches!(swapped, Err(EngineError::InvalidBuilder { .. })));
        assert!(RenderTarget::builder().build(&mut engine).is_err());
    }
}
