use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::candidates::{
    credentials as candidate_credentials, dtos as candidates_dtos, handlers as candidates_handlers,
};
use crate::features::elections::{
    dtos as elections_dtos, events as election_events, handlers as elections_handlers,
};
use crate::features::og::handlers as og_handlers;
use crate::features::partylists::{dtos as partylists_dtos, handlers as partylists_handlers};
use crate::features::positions::{dtos as positions_dtos, handlers as positions_handlers};
use crate::features::voters::{dtos as voters_dtos, handlers as voters_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Elections
        elections_handlers::get_landing,
        elections_handlers::list_elections,
        elections_handlers::create_election,
        elections_handlers::get_election,
        elections_handlers::update_election,
        elections_handlers::delete_election,
        elections_handlers::stream_events,
        // Candidates
        candidates_handlers::list_candidates,
        candidates_handlers::get_candidate,
        candidates_handlers::create_candidate,
        candidates_handlers::update_candidate,
        candidates_handlers::delete_candidate,
        // Partylists
        partylists_handlers::list_partylists,
        partylists_handlers::create_partylist,
        partylists_handlers::update_partylist,
        partylists_handlers::delete_partylist,
        // Positions
        positions_handlers::list_positions,
        positions_handlers::create_position,
        positions_handlers::update_position,
        positions_handlers::delete_position,
        // Voters
        voters_handlers::list_voters,
        voters_handlers::create_voter,
        voters_handlers::delete_voter,
        // Social preview (public)
        og_handlers::get_preview,
    ),
    components(
        schemas(
            Meta,
            // Elections
            elections_dtos::CreateElectionDto,
            elections_dtos::UpdateElectionDto,
            elections_dtos::ElectionResponseDto,
            elections_dtos::LandingResponseDto,
            election_events::ElectionEvent,
            election_events::ChangeTarget,
            election_events::ChangeAction,
            ApiResponse<elections_dtos::ElectionResponseDto>,
            ApiResponse<Vec<elections_dtos::ElectionResponseDto>>,
            ApiResponse<elections_dtos::LandingResponseDto>,
            // Candidates
            candidates_dtos::CreateCandidateDto,
            candidates_dtos::UpdateCandidateDto,
            candidates_dtos::UpdateCandidateForm,
            candidates_dtos::CandidateResponseDto,
            candidate_credentials::Credentials,
            candidate_credentials::Achievement,
            candidate_credentials::Affiliation,
            candidate_credentials::Seminar,
            candidate_credentials::CredentialList,
            candidate_credentials::CredentialChange,
            candidate_credentials::CredentialEdit,
            ApiResponse<candidates_dtos::CandidateResponseDto>,
            ApiResponse<Vec<candidates_dtos::CandidateResponseDto>>,
            // Partylists
            partylists_dtos::CreatePartylistDto,
            partylists_dtos::UpdatePartylistDto,
            partylists_dtos::PartylistResponseDto,
            ApiResponse<partylists_dtos::PartylistResponseDto>,
            ApiResponse<Vec<partylists_dtos::PartylistResponseDto>>,
            // Positions
            positions_dtos::CreatePositionDto,
            positions_dtos::UpdatePositionDto,
            positions_dtos::PositionResponseDto,
            ApiResponse<positions_dtos::PositionResponseDto>,
            ApiResponse<Vec<positions_dtos::PositionResponseDto>>,
            // Voters
            voters_dtos::CreateVoterDto,
            voters_dtos::VoterResponseDto,
            ApiResponse<voters_dtos::VoterResponseDto>,
            ApiResponse<Vec<voters_dtos::VoterResponseDto>>,
        )
    ),
    tags(
        (name = "elections", description = "Elections, landing redirect and live change events"),
        (name = "candidates", description = "Candidates and the candidate editor"),
        (name = "partylists", description = "Partylists (the independent partylist is protected)"),
        (name = "positions", description = "Ballot positions"),
        (name = "voters", description = "Election voter roll"),
        (name = "og", description = "Social preview images (public)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "eBoto Mo Admin API",
        version = "0.1.0",
        description = "Election management API for eBoto Mo commissioners",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_election_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/elections/{election_slug}/candidates/{candidate_id}"));
        assert!(paths.contains_key("/api/elections/{election_slug}/voters"));
        assert!(paths.contains_key("/api/og"));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
