//! Feature normalization: raw attribute bag to canonical [`ParcelRecord`].
//!
//! The dataset has no fixed schema. Different county extracts use
//! different capitalizations and abbreviations for the same semantic
//! field, so each canonical field is backed by an ordered candidate-key
//! table; the first non-empty match wins. New source schemas are handled
//! by extending a table, not by adding branches.
//!
//! Normalization is total: every feature, including one with an empty
//! attribute bag and no usable geometry, produces a well-formed record.

use geo::{Centroid, ChamberlainDuquetteArea};
use serde_json::{Map, Value};
use zoning_map_parcels_models::ParcelRecord;

use crate::config::ParcelsConfig;
use crate::geometry::{SQ_FEET_PER_ACRE, SQ_METERS_PER_ACRE};
use crate::loader::ParcelFeature;

/// Parcel identifier candidates (PCN, folio, and friends). Lowercase
/// keys first: the enriched extract writes them that way.
const ID_KEYS: &[&str] = &[
    "id",
    "parcel_id",
    "PARID",
    "PARCEL_ID",
    "PCN",
    "PARCEL_NUMBER",
    "PARCELID",
    "PARCEL",
    "FOLIO",
    "PROP_ID",
    "PIN",
    "STRAP",
    "PID",
    "OBJECTID",
    "ID",
];

/// Situs address candidates.
const ADDRESS_KEYS: &[&str] = &[
    "address",
    "ADDRESS",
    "SITE_ADDR_STR",
    "SITE_ADDR",
    "SITUS",
    "SITUS_ADDR",
    "SITEADD",
    "FULL_ADD",
    "ADDR",
    "PROP_ADDR",
    "PROPERTY_ADDR",
    "LOCATION",
];

/// Owner name candidates.
const OWNER_KEYS: &[&str] = &[
    "owner",
    "OWNER_NAME1",
    "OWNER_NAME2",
    "OWNER",
    "OWNER1",
    "OWNER2",
    "OWNERNME1",
    "OWNERNME2",
    "OWNER_NAME",
    "OWN_NAME",
    "OWNERNME",
    "OWNER_NA",
];

/// Jurisdiction / municipality candidates.
const JURISDICTION_KEYS: &[&str] = &[
    "jurisdiction",
    "JURISDICTION",
    "JURIS",
    "JURISD",
    "MUNI",
    "MUNINAME",
    "MUNI_NAME",
    "MUNICIPALITY",
    "CITY",
    "CITYNAME",
    "LOCALGOV",
    "TOWN",
];

/// Zoning district candidates. `FCODE` appears early because the county
/// zoning layer publishes its district code there.
const ZONING_KEYS: &[&str] = &[
    "zoning",
    "ZONING",
    "FCODE",
    "ZONING_DESC",
    "ZONING_DIST",
    "ZONE",
    "DISTRICT",
    "ZONING_CODE",
    "ZONE_CODE",
    "ZONECODE",
    "ZONING_CD",
];

/// Future land use candidates.
const FLU_KEYS: &[&str] = &[
    "flu",
    "FLU",
    "FUTURE_LU",
    "FUTURE_LAND_USE",
    "FLU_CODE",
    "FLU_DESIG",
    "LANDUSE",
];

/// Acreage candidates, used verbatim when present.
const ACRES_KEYS: &[&str] = &["areaAcres", "area_acres", "ACRES", "GIS_ACRES", "ACREAGE"];

/// Raw square-footage candidates, converted to acres.
const SQFT_KEYS: &[&str] = &["SQFT", "SQ_FT", "LOT_SQFT", "AREA_SQFT"];

/// Explicit representative-point candidates.
const LAT_KEYS: &[&str] = &["lat", "LAT", "LATITUDE"];
const LNG_KEYS: &[&str] = &["lng", "lon", "LNG", "LON", "LONGITUDE"];

/// Maps a feature's raw attributes to the canonical record shape.
///
/// Never fails; every field has a defined fallback.
#[must_use]
pub fn normalize(feature: &ParcelFeature, config: &ParcelsConfig) -> ParcelRecord {
    let props = &feature.properties;

    let id = first_string(props, ID_KEYS).unwrap_or_default();

    let address = first_string(props, ADDRESS_KEYS).unwrap_or_else(|| {
        if id.is_empty() {
            "Parcel".to_string()
        } else {
            format!("Parcel {id}")
        }
    });

    let (lat, lng) = representative_point(feature, props);

    ParcelRecord {
        address,
        owner: first_string(props, OWNER_KEYS).unwrap_or_default(),
        jurisdiction: first_string(props, JURISDICTION_KEYS)
            .unwrap_or_else(|| config.jurisdiction_fallback.clone()),
        zoning: first_string(props, ZONING_KEYS).unwrap_or_default(),
        flu: first_string(props, FLU_KEYS).unwrap_or_default(),
        area_acres: area_acres(feature, props),
        lat,
        lng,
        geometry: feature.raw_geometry.clone(),
        id,
    }
}

/// Lowercased identifier for exact-match search, empty when absent.
#[must_use]
pub fn normalized_id(feature: &ParcelFeature) -> String {
    first_string(&feature.properties, ID_KEYS)
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}

/// Lowercased address for substring search, empty when absent.
#[must_use]
pub fn normalized_address(feature: &ParcelFeature) -> String {
    first_string(&feature.properties, ADDRESS_KEYS)
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}

/// Acreage: attribute acreage, else raw square footage converted, else
/// spherical geometry area. Negative or non-finite values are discarded.
fn area_acres(feature: &ParcelFeature, props: &Map<String, Value>) -> Option<f64> {
    let acres = first_number(props, ACRES_KEYS)
        .or_else(|| first_number(props, SQFT_KEYS).map(|sqft| sqft / SQ_FEET_PER_ACRE))
        .or_else(|| {
            feature
                .geometry
                .as_ref()
                .map(|mp| mp.chamberlain_duquette_unsigned_area() / SQ_METERS_PER_ACRE)
        })?;

    (acres.is_finite() && acres >= 0.0).then(|| round4(acres))
}

/// Representative point: explicit attributes win, else geometry centroid.
fn representative_point(
    feature: &ParcelFeature,
    props: &Map<String, Value>,
) -> (Option<f64>, Option<f64>) {
    let lat = first_number(props, LAT_KEYS);
    let lng = first_number(props, LNG_KEYS);
    if let (Some(lat), Some(lng)) = (lat, lng) {
        return (Some(lat), Some(lng));
    }

    feature
        .geometry
        .as_ref()
        .and_then(|mp| mp.centroid())
        .map_or((None, None), |centroid| {
            (Some(centroid.y()), Some(centroid.x()))
        })
}

/// First non-empty string-like value among `keys`. Numbers are accepted
/// and formatted (identifier fields are numeric in some extracts).
fn first_string(props: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    for key in keys {
        match props.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// First numeric value among `keys`; numeric strings are parsed.
fn first_number(props: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    for key in keys {
        match props.get(*key) {
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_f64() {
                    return Some(v);
                }
            }
            Some(Value::String(s)) => {
                if let Ok(v) = s.trim().parse::<f64>() {
                    return Some(v);
                }
            }
            _ => {}
        }
    }
    None
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
