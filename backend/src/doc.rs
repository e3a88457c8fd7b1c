//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every `/v1` endpoint and the envelope, request and
//! problem schemas they reference. The document is exported via
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::OpenApi;

use crate::domain::{Movie, User};
use crate::inbound::http::error::ProblemBody;
use crate::inbound::http::movies::{
    CreateMovieRequest, MessageEnvelope, MovieEnvelope, MoviesEnvelope, PatchMovieRequest,
    UpdateMovieRequest,
};
use crate::inbound::http::users::{RegisterUserRequest, UserEnvelope};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Movie catalogue API",
        description = "Movies and user accounts over JSON. Failures are `application/problem+json` documents."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::movies::create_movie,
        crate::inbound::http::movies::list_movies,
        crate::inbound::http::movies::show_movie,
        crate::inbound::http::movies::update_movie,
        crate::inbound::http::movies::patch_movie,
        crate::inbound::http::movies::delete_movie,
        crate::inbound::http::users::register_user,
    ),
    components(schemas(
        Movie,
        User,
        ProblemBody,
        MovieEnvelope,
        MoviesEnvelope,
        MessageEnvelope,
        UserEnvelope,
        CreateMovieRequest,
        UpdateMovieRequest,
        PatchMovieRequest,
        RegisterUserRequest,
    )),
    tags(
        (name = "movies", description = "Movie catalogue"),
        (name = "users", description = "User accounts")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(name: &str, field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).expect("schema registered") {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema {name} should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema for {name}"),
        }
    }

    #[rstest]
    #[case("Movie", "runtime")]
    #[case("Movie", "version")]
    #[case("User", "email")]
    #[case("ProblemBody", "detail")]
    #[case("ProblemBody", "errors")]
    fn schemas_expose_wire_fields(#[case] schema: &str, #[case] field: &str) {
        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    #[case("Movie", "created_at")]
    #[case("User", "password")]
    #[case("User", "version")]
    fn secret_and_internal_fields_are_not_documented(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        if let Some(RefOr::T(Schema::Object(obj))) = schemas.get(schema) {
            assert!(!obj.properties.contains_key(field));
        }
    }

    #[rstest]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in ["/v1/movies", "/v1/movies/{id}", "/v1/users"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
