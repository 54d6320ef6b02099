use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalLink {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub link_url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields of a portal link that seeding keeps in sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalLinkDefinition {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub body: &'static str,
    pub link_url: &'static str,
}

impl PortalLinkDefinition {
    pub fn matches(&self, link: &PortalLink) -> bool {
        link.slug == self.slug
            && link.title == self.title
            && link.description == self.description
            && link.body == self.body
            && link.link_url == self.link_url
    }
}

/// Links every portal installation ships with.
pub fn default_portal_links() -> Vec<PortalLinkDefinition> {
    vec![
        PortalLinkDefinition {
            slug: "plantao",
            title: "Pega plantão",
            description: "Acesse rapidamente o sistema de plantão disponível para novos atendimentos.",
            body: "Clique no link para consultar oportunidades e registrar seu interesse em novos plantões.",
            link_url: "https://pegaplantao.com.br/",
        },
        PortalLinkDefinition {
            slug: "antecipacao",
            title: "Antecipação",
            description: "Orientações para antecipação de pagamentos e fluxos financeiros.",
            body: "Siga as instruções oficiais e valide seus dados antes de solicitar a antecipação.",
            link_url: "https://souarte.tci-br.com/",
        },
        PortalLinkDefinition {
            slug: "plano-saude",
            title: "Plano de saúde",
            description: "Informações sobre credenciamento e cobertura do plano de saúde.",
            body: "Confira os requisitos e acesse o portal para solicitar credenciamento.",
            link_url: "https://wa.me/5569999220012",
        },
    ]
}
