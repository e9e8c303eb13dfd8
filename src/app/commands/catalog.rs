use crate::app::AppContext;
use crate::domain::resolver;
use crate::ports::TemplateGenerator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSummary {
    pub images: usize,
    pub sizes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSummary {
    pub name: String,
    pub generations: Vec<String>,
    pub max_nics: u32,
    pub max_data_disks: u32,
    pub accel_net_mode: String,
    pub shared_disks: bool,
    pub default_disk_sku: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSummary {
    pub key: String,
    pub label: String,
    pub arch: String,
    pub generation: String,
}

/// The catalogs already passed validation when the context was built.
pub fn check<G: TemplateGenerator>(ctx: &AppContext<G>) -> CatalogSummary {
    CatalogSummary { images: ctx.catalogs().images().len(), sizes: ctx.catalogs().sizes().len() }
}

pub fn list_sizes<G: TemplateGenerator>(ctx: &AppContext<G>) -> Vec<SizeSummary> {
    ctx.catalogs()
        .sizes()
        .iter()
        .map(|size| SizeSummary {
            name: size.name.clone(),
            generations: size.tags.generations.iter().map(ToString::to_string).collect(),
            max_nics: size.tags.max_nics,
            max_data_disks: size.tags.max_data_disks,
            accel_net_mode: size.tags.accel_net_mode.as_str().to_string(),
            shared_disks: size.supports_shared_disks(),
            default_disk_sku: resolver::default_disk_sku(size).to_string(),
        })
        .collect()
}

pub fn list_images<G: TemplateGenerator>(ctx: &AppContext<G>) -> Vec<ImageSummary> {
    ctx.catalogs()
        .images()
        .iter()
        .map(|image| ImageSummary {
            key: image.key.clone(),
            label: image.label.clone(),
            arch: image.arch.as_str().to_string(),
            generation: image.generation.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::testing::context;

    use super::*;

    #[test]
    fn summaries_cover_every_entry() {
        let ctx = context();
        let summary = check(&ctx);
        assert_eq!(list_sizes(&ctx).len(), summary.sizes);
        assert_eq!(list_images(&ctx).len(), summary.images);

        let a2 = list_sizes(&ctx).into_iter().find(|s| s.name == "Standard_A2_v2").unwrap();
        assert_eq!(a2.generations, vec!["Gen1"]);
        assert!(!a2.shared_disks);
    }
}
