//! Material packages shipped with the samples.

use lazy_static::lazy_static;

use crate::engine::{MaterialBuilder, MaterialPackage, ParameterType, Shading, VertexAttribute};

lazy_static! {
    /// Unlit, outputs the per-vertex colour.
    pub static ref BAKED_COLOR: MaterialPackage = MaterialBuilder::new()
        .name("bakedColor")
        .shading(Shading::Unlit)
        .require(VertexAttribute::Color)
        .material(
            "void material(inout MaterialInputs material) {
                prepareMaterial(material);
                material.baseColor = getColor();
            }",
        )
        .build();

    /// Standard lit model with every input exposed as a parameter.
    pub static ref SANDBOX_LIT: MaterialPackage = lit_package("sandboxLit");

    /// Lit material given to meshes that come without one.
    pub static ref DEFAULT_LIT: MaterialPackage = lit_package("aiDefaultMat");

    /// Unlit, shows `albedo` projected in screen space so an offscreen render lines up
    /// with the mirror surface it is drawn on.
    pub static ref MIRROR: MaterialPackage = MaterialBuilder::new()
        .name("mirror")
        .shading(Shading::Unlit)
        .require(VertexAttribute::Uv0)
        .parameter("albedo", ParameterType::Sampler2d)
        .material(
            "void material(inout MaterialInputs material) {
                prepareMaterial(material);
                vec2 uv = uvToRenderTargetUV(getNormalizedViewportCoord().xy);
                material.baseColor = texture(materialParams_albedo, uv);
            }",
        )
        .build();
}

fn lit_package(name: &str) -> MaterialPackage {
    MaterialBuilder::new()
        .name(name)
        .shading(Shading::Lit)
        .require(VertexAttribute::Tangents)
        .parameter("baseColor", ParameterType::Float3)
        .parameter("metallic", ParameterType::Float)
        .parameter("roughness", ParameterType::Float)
        .parameter("reflectance", ParameterType::Float)
        .material(
            "void material(inout MaterialInputs material) {
                prepareMaterial(material);
                material.baseColor.rgb = materialParams.baseColor;
                material.metallic = materialParams.metallic;
                material.roughness = materialParams.roughness;
                material.reflectance = materialParams.reflectance;
            }",
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_packages_are_valid() {
        for package in [&*BAKED_COLOR, &*SANDBOX_LIT, &*DEFAULT_LIT, &*MIRROR] {
            assert!(package.is_valid(), "{}: {:?}", package.name(), package.errors());
        }
        assert_eq!(MIRROR.shading(), Shading::Unlit);
        assert_eq!(DEFAULT_LIT.name(), "aiDefaultMat");
    }
}
