//! Static support-resource catalog.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

/// Create the resources router.
pub fn router() -> Router<AppState> {
    Router::new().route("/resources", get(resources))
}

/// A helpline or support service.
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    /// Service name.
    pub name: &'static str,
    /// How to reach it.
    pub description: &'static str,
    /// Service website.
    pub url: &'static str,
}

/// Crisis and general support resources.
#[derive(Debug, Serialize)]
pub struct ResourceCatalog {
    /// Immediate-danger helplines.
    pub crisis: Vec<Resource>,
    /// General mental-health support services.
    pub general: Vec<Resource>,
}

/// The static catalog served to clients.
pub fn catalog() -> ResourceCatalog {
    ResourceCatalog {
        crisis: vec![
            Resource {
                name: "Snehi Suicide Prevention Helpline",
                description: "Call 91-22-2772 6771/6773",
                url: "https://www.snehi.org/",
            },
            Resource {
                name: "iCALL Helpline",
                description: "Call 9152987821",
                url: "https://icallhelpline.org/",
            },
            Resource {
                name: "Kiran Mental Health Rehabilitation Helpline",
                description: "Call 1800-599-0019",
                url: "https://www.mhrdnats.gov.in/",
            },
            Resource {
                name: "Emergency Services (India)",
                description: "Call 112 for immediate assistance",
                url: "https://112.gov.in/",
            },
        ],
        general: vec![
            Resource {
                name: "Vandrevala Foundation",
                description: "Call 9999666555 or 1860-2662-345",
                url: "https://www.vandrevalafoundation.com/",
            },
            Resource {
                name: "Fortis Stress Helpline",
                description: "Call 08376804102",
                url: "https://www.fortishealthcare.com/india/mental-health-and-behavioural-sciences",
            },
        ],
    }
}

/// Serve the support-resource catalog.
async fn resources() -> Json<ResourceCatalog> {
    Json(catalog())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_both_sections() {
        let catalog = catalog();
        assert_eq!(catalog.crisis.len(), 4);
        assert_eq!(catalog.general.len(), 2);
    }
}
