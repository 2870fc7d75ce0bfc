//! Social preview cards rendered as SVG from embedded minijinja templates.

use minijinja::{context, AutoEscape, Environment};
use thiserror::Error;

use crate::core::config::PreviewConfig;
use crate::features::og::dtos::PreviewQuery;

const TEMPLATES: &[(&str, &str)] = &[
    (
        "og/base.svg.jinja",
        include_str!("../../../../templates/og/base.svg.jinja"),
    ),
    (
        "og/candidate.svg.jinja",
        include_str!("../../../../templates/og/candidate.svg.jinja"),
    ),
    (
        "og/election.svg.jinja",
        include_str!("../../../../templates/og/election.svg.jinja"),
    ),
    (
        "og/not_found.svg.jinja",
        include_str!("../../../../templates/og/not_found.svg.jinja"),
    ),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to load template '{name}': {source}")]
    Load {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to render template: {0}")]
    Render(#[from] minijinja::Error),
}

/// What a preview request asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewCard {
    Candidate {
        full_name: String,
        position: String,
        photo_url: Option<String>,
    },
    Election {
        name: String,
        start_date: String,
        end_date: String,
        logo_url: Option<String>,
    },
    NotFound,
}

/// Empty parameters count as missing
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl PreviewCard {
    pub fn from_query(query: &PreviewQuery) -> Self {
        match query.kind.as_deref() {
            Some("candidate") => match (present(&query.full_name), present(&query.position)) {
                (Some(full_name), Some(position)) => PreviewCard::Candidate {
                    full_name,
                    position,
                    photo_url: present(&query.photo_url),
                },
                _ => PreviewCard::NotFound,
            },
            Some("election") => match (
                present(&query.election_name),
                present(&query.election_start_date),
                present(&query.election_end_date),
            ) {
                (Some(name), Some(start_date), Some(end_date)) => PreviewCard::Election {
                    name,
                    start_date,
                    end_date,
                    logo_url: present(&query.election_logo_url),
                },
                _ => PreviewCard::NotFound,
            },
            _ => PreviewCard::NotFound,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, PreviewCard::NotFound)
    }
}

/// Renders preview cards
pub struct PreviewService {
    env: Environment<'static>,
    config: PreviewConfig,
}

impl PreviewService {
    pub fn new(config: PreviewConfig) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        // User text lands in SVG markup and attributes
        env.set_auto_escape_callback(|_| AutoEscape::Html);

        for &(name, source) in TEMPLATES {
            env.add_template(name, source)
                .map_err(|source| TemplateError::Load {
                    name: name.to_string(),
                    source,
                })?;
        }

        Ok(Self { env, config })
    }

    pub fn render(&self, card: &PreviewCard) -> Result<String, TemplateError> {
        let config = &self.config;
        let svg = match card {
            PreviewCard::Candidate {
                full_name,
                position,
                photo_url,
            } => self.env.get_template("og/candidate.svg.jinja")?.render(context! {
                site_name => config.site_name,
                site_logo_url => config.site_logo_url,
                background_url => config.background_url,
                full_name => full_name,
                position => position,
                photo_url => photo_url.as_deref().unwrap_or(&config.default_photo_url),
            })?,
            PreviewCard::Election {
                name,
                start_date,
                end_date,
                logo_url,
            } => self.env.get_template("og/election.svg.jinja")?.render(context! {
                site_name => config.site_name,
                site_logo_url => config.site_logo_url,
                background_url => config.background_url,
                election_name => name,
                start_date => start_date,
                end_date => end_date,
                logo_url => logo_url.as_deref().unwrap_or(&config.default_logo_url),
            })?,
            PreviewCard::NotFound => self
                .env
                .get_template("og/not_found.svg.jinja")?
                .render(context! {})?,
        };

        tracing::debug!("Rendered preview card ({} bytes)", svg.len());
        Ok(svg)
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> PreviewConfig {
    PreviewConfig {
        site_name: "eBoto Mo".to_string(),
        site_logo_url: "https://eboto.test/logo.png".to_string(),
        background_url: "https://eboto.test/background.jpg".to_string(),
        default_photo_url: "https://eboto.test/default-photo.png".to_string(),
        default_logo_url: "https://eboto.test/default-logo.png".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::name::en::Name;
    use fake::Fake;

    fn candidate_query(full_name: &str, position: &str) -> PreviewQuery {
        PreviewQuery {
            kind: Some("candidate".to_string()),
            full_name: Some(full_name.to_string()),
            position: Some(position.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_candidate_card_requires_name_and_position() {
        let mut query = candidate_query("Juan Dela Cruz", "President");
        assert!(PreviewCard::from_query(&query).is_found());

        query.position = Some("  ".to_string());
        assert_eq!(PreviewCard::from_query(&query), PreviewCard::NotFound);
    }

    #[test]
    fn test_election_card_requires_dates() {
        let query = PreviewQuery {
            kind: Some("election".to_string()),
            election_name: Some("SSC 2024".to_string()),
            election_start_date: Some("Jan 1, 2024".to_string()),
            ..Default::default()
        };
        assert_eq!(PreviewCard::from_query(&query), PreviewCard::NotFound);
    }

    #[test]
    fn test_unknown_type_is_not_found() {
        let query = PreviewQuery {
            kind: Some("partylist".to_string()),
            ..Default::default()
        };
        assert_eq!(PreviewCard::from_query(&query), PreviewCard::NotFound);
        assert_eq!(
            PreviewCard::from_query(&PreviewQuery::default()),
            PreviewCard::NotFound
        );
    }

    #[test]
    fn test_candidate_card_renders_text_and_default_photo() {
        let service = PreviewService::new(test_config()).unwrap();
        let full_name: String = Name().fake();
        let card = PreviewCard::from_query(&candidate_query(&full_name, "Governor"));

        let svg = service.render(&card).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Running for Governor"));
        assert!(svg.contains("default-photo.png"));
        assert!(svg.contains("width=\"1200\""));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let service = PreviewService::new(test_config()).unwrap();
        let card = PreviewCard::from_query(&candidate_query(
            "<script>alert(1)</script>",
            "\"President\" & co",
        ));

        let svg = service.render(&card).unwrap();
        assert!(!svg.contains("<script>"));
        assert!(svg.contains("&lt;script&gt;"));
        assert!(svg.contains("&amp; co"));
    }

    #[test]
    fn test_election_card_uses_given_logo() {
        let service = PreviewService::new(test_config()).unwrap();
        let card = PreviewCard::Election {
            name: "SSC Election".to_string(),
            start_date: "Jan 1".to_string(),
            end_date: "Jan 2".to_string(),
            logo_url: Some("https://cdn.test/ssc.png".to_string()),
        };

        let svg = service.render(&card).unwrap();
        assert!(svg.contains("SSC Election"));
        assert!(svg.contains("Jan 1 - Jan 2"));
        assert!(!svg.contains("default-logo.png"));
    }

    #[test]
    fn test_not_found_card() {
        let service = PreviewService::new(test_config()).unwrap();
        let svg = service.render(&PreviewCard::NotFound).unwrap();
        assert!(svg.contains(">404<"));
    }
}
