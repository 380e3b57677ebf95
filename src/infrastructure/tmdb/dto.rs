use std::collections::BTreeSet;

use serde::Deserialize;

use crate::domain::entities::{Configuration, Genre};

/// `/configuration` response body.
#[derive(Debug, Default, Deserialize)]
#[allow(missing_docs)]
pub struct ConfigurationResponse {
    #[serde(default)]
    pub images: ImagesResponse,
    #[serde(default)]
    pub change_keys: BTreeSet<String>,
}

/// Image hosting block of the configuration response.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ImagesResponse {
    pub base_url: String,
    pub secure_base_url: String,
    pub poster_sizes: Vec<String>,
    pub backdrop_sizes: Vec<String>,
    pub logo_sizes: Vec<String>,
    pub profile_sizes: Vec<String>,
    pub still_sizes: Vec<String>,
}

impl From<ConfigurationResponse> for Configuration {
    fn from(response: ConfigurationResponse) -> Self {
        let images = response.images;
        Self {
            image_base_url: images.base_url,
            image_secure_base_url: images.secure_base_url,
            poster_sizes: images.poster_sizes,
            backdrop_sizes: images.backdrop_sizes,
            logo_sizes: images.logo_sizes,
            profile_sizes: images.profile_sizes,
            still_sizes: images.still_sizes,
            change_keys: response.change_keys,
        }
    }
}

/// `/genre/movie/list` response body.
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct GenresResponse {
    #[serde(default)]
    pub genres: Vec<Genre>,
}
