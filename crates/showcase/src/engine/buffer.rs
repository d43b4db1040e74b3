use std::collections::BTreeMap;

use super::{Engine, EngineError, IndexBufferId, Resource, VertexBufferId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexAttribute {
    Position,
    Tangents,
    Color,
    Uv0,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Float2,
    Float3,
    Float4,
    UByte4,
}

impl AttributeType {
    pub fn size(self) -> usize {
        match self {
            AttributeType::Float2 => 8,
            AttributeType::Float3 => 12,
            AttributeType::Float4 => 16,
            AttributeType::UByte4 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLayout {
    pub buffer_index: u8,
    pub ty: AttributeType,
    pub offset: usize,
    pub stride: usize,
    pub normalized: bool,
}

#[derive(Debug, Clone)]
pub struct VertexBuffer {
    vertex_count: usize,
    attributes: BTreeMap<VertexAttribute, AttributeLayout>,
    buffers: Vec<Option<Vec<u8>>>,
}

impl VertexBuffer {
    pub fn builder() -> VertexBufferBuilder {
        VertexBufferBuilder::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn attribute(&self, attribute: VertexAttribute) -> Option<&AttributeLayout> {
        self.attributes.get(&attribute)
    }

    pub fn has_attribute(&self, attribute: VertexAttribute) -> bool {
        self.attributes.contains_key(&attribute)
    }

    /// Bytes uploaded in slot `buffer_index`, if any.
    pub fn data(&self, buffer_index: u8) -> Option<&[u8]> {
        self.buffers
            .get(buffer_index as usize)
            .and_then(|b| b.as_deref())
    }

    pub(super) fn upload(
        &mut self,
        id: VertexBufferId,
        buffer_index: u8,
        data: &[u8],
    ) -> Result<(), EngineError> {
        let stride = self
            .attributes
            .values()
            .filter(|a| a.buffer_index == buffer_index)
            .map(|a| a.stride)
            .max()
            .ok_or_else(|| EngineError::InvalidBuilder {
                what: "vertex buffer upload",
                reason: format!("no attribute lives in buffer {buffer_index}"),
            })?;

        let expected = self.vertex_count * stride;
        if data.len() != expected {
            return Err(EngineError::BufferSizeMismatch {
                resource: Resource::from(id),
                expected,
                found: data.len(),
            });
        }

        log::trace!("uploading {expected} bytes to {} slot {buffer_index}", Resource::from(id));
        self.buffers[buffer_index as usize] = Some(data.to_vec());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct VertexBufferBuilder {
    vertex_count: usize,
    buffer_count: u8,
    attributes: BTreeMap<VertexAttribute, AttributeLayout>,
    normalized: Vec<VertexAttribute>,
}

impl VertexBufferBuilder {
    pub fn vertex_count(mut self, count: usize) -> Self {
        self.vertex_count = count;
        self
    }

    pub fn buffer_count(mut self, count: u8) -> Self {
        self.buffer_count = count;
        self
    }

    pub fn attribute(
        mut self,
        attribute: VertexAttribute,
        buffer_index: u8,
        ty: AttributeType,
        offset: usize,
        stride: usize,
    ) -> Self {
        self.attributes.insert(
            attribute,
            AttributeLayout {
                buffer_index,
                ty,
                offset,
                stride,
                normalized: false,
            },
        );
        self
    }

    /// Integer attribute is read as a [0, 1] float in the shader.
    pub fn normalized(mut self, attribute: VertexAttribute) -> Self {
        self.normalized.push(attribute);
        self
    }

    pub fn build(mut self, engine: &mut Engine) -> Result<VertexBufferId, EngineError> {
        let invalid = |reason: String| EngineError::InvalidBuilder {
            what: "vertex buffer",
            reason,
        };

        if self.vertex_count == 0 {
            return Err(invalid("vertex count is zero".into()));
        }
        if self.buffer_count == 0 {
            return Err(invalid("buffer count is zero".into()));
        }
        for attribute in &self.normalized {
            self.attributes
                .get_mut(attribute)
                .ok_or_else(|| invalid(format!("{attribute:?} normalized but never declared")))?
                .normalized = true;
        }
        for (attribute, layout) in &self.attributes {
            if layout.buffer_index >= self.buffer_count {
                return Err(invalid(format!(
                    "{attribute:?} uses buffer {} of {}",
                    layout.buffer_index, self.buffer_count
                )));
            }
            if layout.offset + layout.ty.size() > layout.stride {
                return Err(invalid(format!(
                    "{attribute:?} ({:?} at offset {}) overflows stride {}",
                    layout.ty, layout.offset, layout.stride
                )));
            }
        }

        let id = VertexBufferId(engine.next_id());
        log::trace!(
            "vertex buffer {}: {} vertices, {} attributes",
            id.0,
            self.vertex_count,
            self.attributes.len()
        );
        engine.vertex_buffers.insert(
            id,
            VertexBuffer {
                vertex_count: self.vertex_count,
                attributes: self.attributes,
                buffers: vec![None; self.buffer_count as usize],
            },
        );
        Ok(id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexType {
    #[default]
    UShort,
    UInt,
}

impl IndexType {
    pub fn size(self) -> usize {
        match self {
            IndexType::UShort => 2,
            IndexType::UInt => 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexBuffer {
    index_count: usize,
    index_type: IndexType,
    data: Option<Vec<u8>>,
}

impl IndexBuffer {
    pub fn builder() -> IndexBufferBuilder {
        IndexBufferBuilder::default()
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    pub(super) fn upload(&mut self, id: IndexBufferId, data: &[u8]) -> Result<(), EngineError> {
        let expected = self.index_count * self.index_type.size();
        if data.len() != expected {
            return Err(EngineError::BufferSizeMismatch {
                resource: Resource::from(id),
                expected,
                found: data.len(),
            });
        }
        self.data = Some(data.to_vec());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndexBufferBuilder {
    index_count: usize,
    index_type: IndexType,
}

impl IndexBufferBuilder {
    pub fn index_count(mut self, count: usize) -> Self {
        self.index_count = count;
        self
    }

    pub fn buffer_type(mut self, ty: IndexType) -> Self {
        self.index_type = ty;
        self
    }

    pub fn build(self, engine: &mut Engine) -> Result<IndexBufferId, EngineError> {
        if self.index_count == 0 {
            return Err(EngineError::InvalidBuilder {
                what: "index buffer",
                reason: "index count is zero".into(),
            });
        }
        let id = IndexBufferId(engine.next_id());
        engine.index_buffers.insert(
            id,
            IndexBuffer {
                index_count: self.index_count,
                index_type: self.index_type,
                data: None,
            },
        );
        Ok(id)
    }
}
