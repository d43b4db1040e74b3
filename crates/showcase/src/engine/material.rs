use std::collections::{BTreeMap, BTreeSet};

use glam::{Vec3, Vec4};

use super::{Engine, EngineError, MaterialId, TextureId, VertexAttribute};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Shading {
    #[default]
    Lit,
    Unlit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetApi {
    OpenGl,
    Vulkan,
    Metal,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    Float,
    Float3,
    Float4,
    Sampler2d,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MinFilter {
    Nearest,
    #[default]
    Linear,
    LinearMipmapLinear,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MagFilter {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompareMode {
    #[default]
    None,
    CompareToTexture,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextureSampler {
    pub min: MinFilter,
    pub mag: MagFilter,
    pub compare_mode: CompareMode,
}

impl TextureSampler {
    pub fn new(min: MinFilter, mag: MagFilter) -> Self {
        Self {
            min,
            mag,
            compare_mode: CompareMode::None,
        }
    }

    pub fn with_compare_mode(self, compare_mode: CompareMode) -> Self {
        Self {
            compare_mode,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RgbType {
    Linear,
    Srgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue {
    Float(f32),
    Float3(Vec3),
    Float4(Vec4),
    Rgb(RgbType, Vec3),
    Texture(TextureId, TextureSampler),
}

impl ParameterValue {
    pub fn ty(&self) -> ParameterType {
        match self {
            ParameterValue::Float(_) => ParameterType::Float,
            ParameterValue::Float3(_) | ParameterValue::Rgb(..) => ParameterType::Float3,
            ParameterValue::Float4(_) => ParameterType::Float4,
            ParameterValue::Texture(..) => ParameterType::Sampler2d,
        }
    }
}

/// Output of [MaterialBuilder::build]: a material description that may or may not have
/// compiled. Invalid packages are refused by [Material] creation.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialPackage {
    name: String,
    shading: Shading,
    target_api: TargetApi,
    required: BTreeSet<VertexAttribute>,
    parameters: BTreeMap<String, ParameterType>,
    errors: Vec<String>,
}

impl MaterialPackage {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shading(&self) -> Shading {
        self.shading
    }

    pub fn target_api(&self) -> TargetApi {
        self.target_api
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Reasons the package failed to build.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// Assembles a [MaterialPackage] from a name, its parameters, the vertex attributes it
/// reads and the body of its `material()` function.
#[derive(Debug, Clone, Default)]
pub struct MaterialBuilder {
    name: String,
    shading: Shading,
    target_api: TargetApi,
    required: BTreeSet<VertexAttribute>,
    parameters: Vec<(String, ParameterType)>,
    source: Option<String>,
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl MaterialBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn shading(mut self, shading: Shading) -> Self {
        self.shading = shading;
        self
    }

    pub fn target_api(mut self, api: TargetApi) -> Self {
        self.target_api = api;
        self
    }

    pub fn require(mut self, attribute: VertexAttribute) -> Self {
        self.required.insert(attribute);
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, ty: ParameterType) -> Self {
        self.parameters.push((name.into(), ty));
        self
    }

    pub fn material(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn build(self) -> MaterialPackage {
        let mut errors = Vec::new();
        if self.name.is_empty() {
            errors.push("material has no name".to_owned());
        }
        match &self.source {
            None => errors.push("no material() body".to_owned()),
            Some(source) if !source.contains("void material(") => {
                errors.push("body does not define `void material(...)`".to_owned())
            }
            Some(_) => {}
        }

        let mut parameters = BTreeMap::new();
        for (name, ty) in self.parameters {
            if !is_identifier(&name) {
                errors.push(format!("`{name}` is not a valid parameter name"));
            } else if parameters.insert(name.clone(), ty).is_some() {
                errors.push(format!("parameter `{name}` declared twice"));
            }
        }

        if !errors.is_empty() {
            log::warn!("material `{}` failed to build: {}", self.name, errors.join("; "));
        }
        MaterialPackage {
            name: self.name,
            shading: self.shading,
            target_api: self.target_api,
            required: self.required,
            parameters,
            errors,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    package: MaterialPackage,
}

impl Material {
    pub fn builder() -> MaterialLoader {
        MaterialLoader::default()
    }

    pub fn name(&self) -> &str {
        &self.package.name
    }

    pub fn shading(&self) -> Shading {
        self.package.shading
    }

    /// Vertex attributes a renderable must provide to be drawn with this material.
    pub fn required_attributes(&self) -> impl Iterator<Item = VertexAttribute> + '_ {
        self.package.required.iter().copied()
    }

    pub fn parameter_type(&self, name: &str) -> Option<ParameterType> {
        self.package.parameters.get(name).copied()
    }

    pub(super) fn instantiate(&self, material: MaterialId) -> MaterialInstance {
        MaterialInstance {
            material,
            values: BTreeMap::new(),
        }
    }

    pub(super) fn check_parameter(
        &self,
        name: &str,
        value: &ParameterValue,
    ) -> Result<(), EngineError> {
        let invalid = |reason: String| EngineError::InvalidParameter {
            material: self.package.name.clone(),
            name: name.to_owned(),
            reason,
        };
        match self.parameter_type(name) {
            None => Err(invalid("no such parameter".into())),
            Some(ty) if ty != value.ty() => {
                Err(invalid(format!("expected {ty:?}, got {:?}", value.ty())))
            }
            Some(_) => Ok(()),
        }
    }
}

/// Creates a [Material] from a compiled package.
#[derive(Debug, Clone, Default)]
pub struct MaterialLoader {
    package: Option<MaterialPackage>,
}

impl MaterialLoader {
    pub fn package(mut self, package: &MaterialPackage) -> Self {
        self.package = Some(package.clone());
        self
    }

    pub fn build(self, engine: &mut Engine) -> Result<MaterialId, EngineError> {
        let package = self.package.ok_or(EngineError::InvalidBuilder {
            what: "material",
            reason: "no package given".into(),
        })?;
        if !package.is_valid() {
            return Err(EngineError::InvalidPackage { name: package.name });
        }

        let id = MaterialId(engine.next_id());
        log::trace!("material {} from package `{}`", id.0, package.name);
        engine.materials.insert(id, Material { package });
        Ok(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialInstance {
    material: MaterialId,
    values: BTreeMap<String, ParameterValue>,
}

impl MaterialInstance {
    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub(super) fn set(&mut self, name: &str, value: ParameterValue) {
        self.values.insert(name.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Resource, Texture};

    fn unlit_quad() -> MaterialBuilder {
        MaterialBuilder::new()
            .name("unlit_quad")
            .target_api(TargetApi::All)
            .shading(Shading::Unlit)
            .require(VertexAttribute::Uv0)
            .parameter("albedo", ParameterType::Sampler2d)
            .material(
                "void material(inout MaterialInputs material) {\n\
                 prepareMaterial(material);\n\
                 material.baseColor = texture(materialParams_albedo, getUV0());\n}\n",
            )
    }

    #[test]
    fn package_validity() {
        assert!(unlit_quad().build().is_valid());

        let unnamed = unlit_quad().name("").build();
        assert!(!unnamed.is_valid());

        let twice = unlit_quad().parameter("albedo", ParameterType::Float).build();
        assert_eq!(twice.errors().len(), 1);

        let no_body = MaterialBuilder::new().name("empty").build();
        assert!(!no_body.is_valid());

        let bad_name = unlit_quad().parameter("2fast", ParameterType::Float).build();
        assert!(!bad_name.is_valid());
    }

    #[test]
    fn invalid_package_is_refused() {
        let mut engine = Engine::default();
        let package = unlit_quad().material("nope").build();
        assert_eq!(
            Material::builder().package(&package).build(&mut engine),
            Err(EngineError::InvalidPackage {
                name: "unlit_quad".into()
            })
        );
    }

    #[test]
    fn parameters_are_type_checked() {
        let mut engine = Engine::default();
        let material = Material::builder()
            .package(&unlit_quad().build())
            .build(&mut engine)
            .unwrap();
        assert_eq!(
            engine.material(material).unwrap().required_attributes().collect::<Vec<_>>(),
            [VertexAttribute::Uv0]
        );
        let mi = engine.create_instance(material).unwrap();
        let texture = Texture::builder().build(&mut engine).unwrap();

        let sampler = TextureSampler::new(MinFilter::Linear, MagFilter::Linear)
            .with_compare_mode(CompareMode::CompareToTexture);
        engine
            .set_parameter(mi, "albedo", ParameterValue::Texture(texture, sampler))
            .unwrap();
        assert_eq!(
            engine.material_instance(mi).unwrap().parameter("albedo"),
            Some(&ParameterValue::Texture(texture, sampler))
        );

        assert!(matches!(
            engine.set_parameter(mi, "albedo", ParameterValue::Float(1.0)),
            Err(EngineError::InvalidParameter { .. })
        ));
        assert!(engine
            .set_parameter(mi, "roughness", ParameterValue::Float(1.0))
            .is_err());

        assert!(matches!(
            engine.destroy(material),
            Err(EngineError::InUse {
                resource: Resource::MaterialId(_),
                ..
            })
        ));
        engine.destroy(mi).unwrap();
        engine.destroy(material).unwrap();
        engine.destroy(texture).unwrap();
        engine.shutdown().unwrap();
    }
}
