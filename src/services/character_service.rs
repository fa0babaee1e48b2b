use tracing::debug;

use crate::{config::AppConfig, dto::character::CharacterImageResponse};

/// Resolve the image for `character` in `title` from the configured table.
pub fn character_image(config: &AppConfig, title: &str, character: &str) -> CharacterImageResponse {
    let image_url = match config.character_image(title, character) {
        Some(image) => image.to_owned(),
        None => {
            debug!(title, character, "no image configured for character");
            config.default_character_image().to_owned()
        }
    };

    CharacterImageResponse {
        title: title.to_owned(),
        character: character.to_owned(),
        image_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_character_resolves_to_configured_image() {
        let response = character_image(&AppConfig::default(), "The Last of Us", "Joel Miller");
        assert_eq!(response.image_url, "joel-miller.jpg");
    }

    #[test]
    fn unknown_character_falls_back_to_default_image() {
        let config = AppConfig::default();
        let response = character_image(&config, "Hades", "Zagreus");
        assert_eq!(response.image_url, config.default_character_image());
        assert_eq!(response.title, "Hades");
        assert_eq!(response.character, "Zagreus");
    }
}
