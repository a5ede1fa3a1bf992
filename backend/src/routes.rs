use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::error;
use serde::Serialize;
use shared::{AnalysisResponse, Location, SceneAnalysisResponse};
use std::collections::HashMap;
use std::env;
use std::io::Write;

use crate::model::{ScenePrompt, is_suspicious};
use crate::vision::VisionProvider;

const SCENE_FIELDS: [&str; 4] = ["x", "y", "z", "timestamp"];
const SCENE_IMAGES: [&str; 3] = ["image1", "image2", "image3"];

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// Both handlers serve POST /analyze-image, so a process mounts exactly one
// of them depending on the deployment.
#[derive(Clone, Copy, Debug)]
pub enum AnalyzeMode {
    Single,
    TriCamera,
}

impl AnalyzeMode {
    pub fn from_env() -> Self {
        match env::var("ANALYZE_MODE").as_deref() {
            Ok("multi") => AnalyzeMode::TriCamera,
            _ => AnalyzeMode::Single,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, mode: AnalyzeMode) {
    let route = match mode {
        AnalyzeMode::Single => web::post().to(analyze_image),
        AnalyzeMode::TriCamera => web::post().to(analyze_scene),
    };
    cfg.service(web::resource("/analyze-image").route(route));
}

struct FormData {
    files: HashMap<String, Vec<u8>>,
    fields: HashMap<String, String>,
}

// Parts carrying a filename are collected as images, the rest as scalar
// form fields.
async fn collect_form(mut payload: Multipart) -> Result<FormData, Error> {
    let mut files = HashMap::new();
    let mut fields = HashMap::new();

    while let Ok(Some(mut field)) = payload.try_next().await {
        let name = match field.name() {
            Some(name) => name.to_owned(),
            None => continue,
        };
        let is_file = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .is_some();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            data.write_all(&chunk)?;
        }

        if is_file {
            files.insert(name, data);
        } else {
            fields.insert(name, String::from_utf8_lossy(&data).into_owned());
        }
    }

    Ok(FormData { files, fields })
}

async fn analyze_image(
    provider: web::Data<dyn VisionProvider>,
    payload: Multipart,
) -> Result<HttpResponse, Error> {
    let form = collect_form(payload).await?;

    let image = match form.files.get("image") {
        Some(image) => image,
        None => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing image file".into(),
            }));
        }
    };

    let prompt = ScenePrompt::single(image);
    match provider.classify(&prompt).await {
        Ok(reply) => {
            let result = reply.trim();
            Ok(HttpResponse::Ok().json(AnalysisResponse {
                result: result.to_string(),
                suspicious: is_suspicious(result),
            }))
        }
        Err(e) => {
            error!("Vision provider error: {}", e);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: e.to_string(),
            }))
        }
    }
}

async fn analyze_scene(
    provider: web::Data<dyn VisionProvider>,
    payload: Multipart,
) -> Result<HttpResponse, Error> {
    let form = collect_form(payload).await?;

    if !SCENE_FIELDS
        .iter()
        .all(|field| form.fields.contains_key(*field))
    {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Missing one or more required fields: x, y, z, timestamp".into(),
        }));
    }

    if !SCENE_IMAGES
        .iter()
        .all(|image| form.files.contains_key(*image))
    {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Missing one or more required image files: image1, image2, image3".into(),
        }));
    }

    let x = form.fields["x"].clone();
    let y = form.fields["y"].clone();
    let z = form.fields["z"].clone();
    let timestamp = form.fields["timestamp"].clone();

    let images: Vec<&[u8]> = SCENE_IMAGES
        .iter()
        .map(|image| form.files[*image].as_slice())
        .collect();
    let prompt = ScenePrompt::tri_camera(&images, &x, &y, &z, &timestamp);

    match provider.classify(&prompt).await {
        Ok(reply) => {
            let result = reply.trim();
            Ok(HttpResponse::Ok().json(SceneAnalysisResponse {
                result: result.to_string(),
                suspicious: is_suspicious(result),
                location: Location { x, y, z },
                timestamp,
            }))
        }
        Err(e) => {
            error!("Vision provider error: {}", e);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: e.to_string(),
            }))
        }
    }
}
