use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const SINGLE_CAMERA_PROMPT: &str = "You are analyzing a real-world scene captured by a security camera.\n\
Respond in one word:\n\
'Suspicious' – if the image suggests an unusual, dangerous or out-of-place object/event.\n\
Otherwise, return 'Not suspicious'. Respond with only one word.";

// One text block followed by one image block per camera, in upload order.
#[derive(Clone)]
pub struct ScenePrompt {
    pub instruction: String,
    pub image_urls: Vec<String>,
}

impl ScenePrompt {
    pub fn single(image: &[u8]) -> Self {
        Self {
            instruction: SINGLE_CAMERA_PROMPT.to_string(),
            image_urls: vec![encode_image(image)],
        }
    }

    pub fn tri_camera(images: &[&[u8]], x: &str, y: &str, z: &str, timestamp: &str) -> Self {
        let instruction = format!(
            "You are analyzing a real-world scene captured from three different cameras.\n\
             The location is X={}, Y={}, Z={} and the time is {}.\n\
             Based on the combined visual evidence, respond in one word:\n\
             'Suspicious' – if any of the images or the combined context suggest an unusual, dangerous or out-of-place object/event.\n\
             Otherwise, return 'Not suspicious'. Respond with only one word.",
            x, y, z, timestamp
        );
        Self {
            instruction,
            image_urls: images.iter().map(|image| encode_image(image)).collect(),
        }
    }
}

// Uploads are labeled as JPEG regardless of their actual encoding.
pub fn encode_image(image: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(image))
}

pub fn is_suspicious(reply: &str) -> bool {
    reply.trim().to_lowercase().starts_with("suspicious")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_matches_prefix_case_insensitively() {
        assert!(is_suspicious("Suspicious"));
        assert!(is_suspicious("SUSPICIOUS!!"));
        assert!(is_suspicious("  suspicious activity near gate  "));
        assert!(!is_suspicious("Not suspicious"));
        assert!(!is_suspicious("unclear"));
        assert!(!is_suspicious(""));
    }

    #[test]
    fn encoded_image_is_a_jpeg_data_uri() {
        assert_eq!(encode_image(&[0, 1, 2]), "data:image/jpeg;base64,AAEC");
    }

    #[test]
    fn tri_camera_prompt_interpolates_metadata_and_keeps_order() {
        let images: [&[u8]; 3] = [b"first", b"second", b"third"];
        let prompt = ScenePrompt::tri_camera(&images, "12.3", "45.6", "0", "2024-01-01T00:00:00Z");

        assert!(prompt.instruction.contains("X=12.3, Y=45.6, Z=0"));
        assert!(prompt.instruction.contains("the time is 2024-01-01T00:00:00Z"));
        assert_eq!(prompt.image_urls.len(), 3);
        assert_eq!(prompt.image_urls[0], encode_image(b"first"));
        assert_eq!(prompt.image_urls[2], encode_image(b"third"));
    }
}
