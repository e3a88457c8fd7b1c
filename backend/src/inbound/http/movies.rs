//! Movie catalogue handlers.
//!
//! ```text
//! POST   /v1/movies       {"title":"Moana","year":2016,"runtime":"107 mins","genres":["animation"]}
//! GET    /v1/movies?title=moana&sort=-year&page=1&page_size=20
//! GET    /v1/movies/{id}
//! PUT    /v1/movies       {"id":1,"version":1,"title":"Moana"}
//! PATCH  /v1/movies/{id}  {"version":1,"year":2017}
//! DELETE /v1/movies/{id}
//! ```

use actix_web::http::header::LOCATION;
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use pagination::PageMetadata;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::movie::validate_movie_id;
use crate::domain::{Error, Movie, MovieDraft, MoviePatch, Runtime};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ProblemBody;
use crate::inbound::http::json::StrictJson;
use crate::inbound::http::query::{QueryParams, movie_list_query};
use crate::inbound::http::state::HttpState;

/// Request body for `POST /v1/movies`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateMovieRequest {
    #[schema(example = "Moana")]
    pub title: Option<String>,
    #[schema(example = 2016)]
    pub year: Option<i32>,
    #[schema(value_type = Option<String>, example = "107 mins")]
    pub runtime: Option<Runtime>,
    #[schema(example = json!(["animation", "adventure"]))]
    pub genres: Option<Vec<String>>,
}

impl From<CreateMovieRequest> for MovieDraft {
    fn from(value: CreateMovieRequest) -> Self {
        Self {
            title: value.title,
            year: value.year,
            runtime: value.runtime,
            genres: value.genres,
        }
    }
}

/// Request body for `PUT /v1/movies`; the movie is named by `id`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateMovieRequest {
    #[schema(example = 1)]
    pub id: Option<i64>,
    #[schema(example = 1)]
    pub version: Option<i32>,
    pub title: Option<String>,
    pub year: Option<i32>,
    #[schema(value_type = Option<String>, example = "107 mins")]
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

impl From<UpdateMovieRequest> for MoviePatch {
    fn from(value: UpdateMovieRequest) -> Self {
        Self {
            title: value.title,
            year: value.year,
            runtime: value.runtime,
            genres: value.genres,
            version: value.version,
        }
    }
}

/// Request body for `PATCH /v1/movies/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PatchMovieRequest {
    #[schema(example = 1)]
    pub version: Option<i32>,
    pub title: Option<String>,
    pub year: Option<i32>,
    #[schema(value_type = Option<String>, example = "107 mins")]
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

impl From<PatchMovieRequest> for MoviePatch {
    fn from(value: PatchMovieRequest) -> Self {
        Self {
            title: value.title,
            year: value.year,
            runtime: value.runtime,
            genres: value.genres,
            version: value.version,
        }
    }
}

/// `{"movie": ...}`
#[derive(Debug, Serialize, ToSchema)]
pub struct MovieEnvelope {
    pub movie: Movie,
}

/// `{"movies": [...], "metadata": {...}}`
#[derive(Debug, Serialize, ToSchema)]
pub struct MoviesEnvelope {
    pub movies: Vec<Movie>,
    /// Paging details; empty when nothing matched.
    #[schema(value_type = Object)]
    pub metadata: PageMetadata,
}

/// `{"message": ...}`
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageEnvelope {
    #[schema(example = "movie successfully deleted")]
    pub message: String,
}

/// Parse a positive movie identifier from the route.
fn parse_id(raw: &str) -> Result<i64, Error> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or_else(|| Error::invalid_request("invalid id parameter from route parameters"))
}

/// Create a movie.
#[utoipa::path(
    post,
    path = "/v1/movies",
    request_body = CreateMovieRequest,
    responses(
        (status = 201, description = "Movie created", body = MovieEnvelope,
            headers(("Location" = String, description = "URL of the new movie"))),
        (status = 400, description = "Malformed body", body = ProblemBody),
        (status = 422, description = "Validation failed", body = ProblemBody),
        (status = 500, description = "Internal server error", body = ProblemBody)
    ),
    tags = ["movies"],
    operation_id = "createMovie"
)]
#[post("/movies")]
pub async fn create_movie(
    state: web::Data<HttpState>,
    payload: StrictJson<CreateMovieRequest>,
) -> ApiResult<HttpResponse> {
    let movie = state.movies.create(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created()
        .insert_header((LOCATION, format!("/v1/movies/{}", movie.id)))
        .json(MovieEnvelope { movie }))
}

/// List movies matching the query filters.
#[utoipa::path(
    get,
    path = "/v1/movies",
    params(
        ("title" = Option<String>, Query, description = "Case-insensitive title substring"),
        ("genres" = Option<String>, Query, description = "Genre substring"),
        ("page" = Option<i64>, Query, description = "One-based page number"),
        ("page_size" = Option<i64>, Query, description = "Records per page, at most 100"),
        ("sort" = Option<String>, Query, description = "id, title, year or runtime; prefix - to reverse")
    ),
    responses(
        (status = 200, description = "Matching movies", body = MoviesEnvelope),
        (status = 400, description = "Malformed query string", body = ProblemBody),
        (status = 422, description = "Invalid filters", body = ProblemBody),
        (status = 500, description = "Internal server error", body = ProblemBody)
    ),
    tags = ["movies"],
    operation_id = "listMovies"
)]
#[get("/movies")]
pub async fn list_movies(
    state: web::Data<HttpState>,
    req: HttpRequest,
) -> ApiResult<web::Json<MoviesEnvelope>> {
    let params = web::Query::<QueryParams>::from_query(req.query_string())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let (query, validator) = movie_list_query(&params);
    let (movies, metadata) = state.movies.list(query, validator).await?;
    Ok(web::Json(MoviesEnvelope { movies, metadata }))
}

/// Fetch one movie.
#[utoipa::path(
    get,
    path = "/v1/movies/{id}",
    params(("id" = i64, Path, description = "Movie identifier")),
    responses(
        (status = 200, description = "The movie", body = MovieEnvelope),
        (status = 400, description = "Invalid identifier", body = ProblemBody),
        (status = 404, description = "No such movie", body = ProblemBody),
        (status = 500, description = "Internal server error", body = ProblemBody)
    ),
    tags = ["movies"],
    operation_id = "showMovie"
)]
#[get("/movies/{id}")]
pub async fn show_movie(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MovieEnvelope>> {
    let id = parse_id(&path)?;
    let movie = state.movies.get(id).await?;
    Ok(web::Json(MovieEnvelope { movie }))
}

/// Replace fields of the movie named in the body.
#[utoipa::path(
    put,
    path = "/v1/movies",
    request_body = UpdateMovieRequest,
    responses(
        (status = 204, description = "Movie updated"),
        (status = 400, description = "Malformed body", body = ProblemBody),
        (status = 404, description = "No such movie", body = ProblemBody),
        (status = 409, description = "Edit conflict", body = ProblemBody),
        (status = 422, description = "Validation failed", body = ProblemBody),
        (status = 500, description = "Internal server error", body = ProblemBody)
    ),
    tags = ["movies"],
    operation_id = "updateMovie"
)]
#[put("/movies")]
pub async fn update_movie(
    state: web::Data<HttpState>,
    payload: StrictJson<UpdateMovieRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let id = validate_movie_id(request.id)?;
    state.movies.update(id, request.into()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Change only the provided fields of a movie.
#[utoipa::path(
    patch,
    path = "/v1/movies/{id}",
    params(("id" = i64, Path, description = "Movie identifier")),
    request_body = PatchMovieRequest,
    responses(
        (status = 200, description = "The updated movie", body = MovieEnvelope),
        (status = 400, description = "Malformed body or identifier", body = ProblemBody),
        (status = 404, description = "No such movie", body = ProblemBody),
        (status = 409, description = "Edit conflict", body = ProblemBody),
        (status = 422, description = "Validation failed", body = ProblemBody),
        (status = 500, description = "Internal server error", body = ProblemBody)
    ),
    tags = ["movies"],
    operation_id = "patchMovie"
)]
#[patch("/movies/{id}")]
pub async fn patch_movie(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: StrictJson<PatchMovieRequest>,
) -> ApiResult<web::Json<MovieEnvelope>> {
    let id = parse_id(&path)?;
    let movie = state.movies.update(id, payload.into_inner().into()).await?;
    Ok(web::Json(MovieEnvelope { movie }))
}

/// Delete a movie.
#[utoipa::path(
    delete,
    path = "/v1/movies/{id}",
    params(("id" = i64, Path, description = "Movie identifier")),
    responses(
        (status = 200, description = "Movie deleted", body = MessageEnvelope),
        (status = 400, description = "Invalid identifier", body = ProblemBody),
        (status = 404, description = "No such movie", body = ProblemBody),
        (status = 500, description = "Internal server error", body = ProblemBody)
    ),
    tags = ["movies"],
    operation_id = "deleteMovie"
)]
#[delete("/movies/{id}")]
pub async fn delete_movie(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageEnvelope>> {
    let id = parse_id(&path)?;
    state.movies.delete(id).await?;
    Ok(web::Json(MessageEnvelope {
        message: "movie successfully deleted".to_owned(),
    }))
}
