//! HTTP handler functions for the zoning map API.

use actix_web::{HttpResponse, web};
use zoning_map_parcels::ParcelsError;
use zoning_map_server_models::{
    ApiHealth, ApiParcelResponse, ApiSearchResponse, BufferQueryParams, PointQueryParams,
    SearchQueryParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        index: state.index.stats(),
    })
}

/// `GET /api/geo/parcel-by-point?lat=&lng=`
///
/// Returns the parcel containing the point, 404 when no parcel does,
/// 400 for invalid coordinates.
pub async fn parcel_by_point(
    state: web::Data<AppState>,
    params: web::Query<PointQueryParams>,
) -> HttpResponse {
    let (Some(lat), Some(lng)) = (params.lat, params.lng) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid lat/lng"
        }));
    };

    match state.index.query_point(lat, lng) {
        Ok(Some(parcel)) => HttpResponse::Ok().json(ApiParcelResponse { parcel }),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "No parcel found"
        })),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/geo/buffer?lat=&lng=&radiusFeet=`
///
/// Returns every parcel intersecting the notice radius around the point.
pub async fn buffer(
    state: web::Data<AppState>,
    params: web::Query<BufferQueryParams>,
) -> HttpResponse {
    let (Some(lat), Some(lng)) = (params.lat, params.lng) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid lat/lng"
        }));
    };
    let Some(radius_feet) = params.radius_feet else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid radiusFeet"
        }));
    };

    match state.index.query_buffer(lat, lng, radius_feet) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/geo/search?parcel=ID` / `GET /api/geo/search?address=TEXT`
pub async fn search(
    state: web::Data<AppState>,
    params: web::Query<SearchQueryParams>,
) -> HttpResponse {
    let parcel = params.parcel.as_deref().map(str::trim).unwrap_or_default();
    let address = params.address.as_deref().map(str::trim).unwrap_or_default();

    if parcel.is_empty() && address.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Provide parcel or address"
        }));
    }

    let results = if parcel.is_empty() {
        state.index.search_by_address(address)
    } else {
        state.index.search_by_id(parcel)
    };

    HttpResponse::Ok().json(ApiSearchResponse { results })
}

/// Maps a core error to an HTTP response: invalid input is the caller's
/// fault, anything else is ours.
fn error_response(error: &ParcelsError) -> HttpResponse {
    match error {
        ParcelsError::InvalidQuery { message } => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
        }
        other => {
            log::error!("Parcel query failed: {other}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Parcel query failed"
            }))
        }
    }
}
