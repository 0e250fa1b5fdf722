use crate::api::ModelDescriptor;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

impl ModelDescriptor {
    /// Size in gibibytes with one decimal, e.g. `"4.1 GB"`.
    pub fn size_display(&self) -> String {
        if self.size_bytes == 0 {
            return "Unknown size".to_string();
        }
        format!("{:.1} GB", self.size_bytes as f64 / BYTES_PER_GIB)
    }
}

pub fn sort_models(models: &mut [ModelDescriptor]) {
    // Alphabetical, case-insensitive; ties broken by exact name for stable output
    models.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}
