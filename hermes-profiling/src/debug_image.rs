use serde::{Deserialize, Serialize};

use crate::types::Addr;
use crate::utils;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    MachO,
    Symbolic,
    Sourcemap,
    Proguard,
    Jvm,
}

/// A debug file referenced by a profile.
///
/// Apple profiles list the Mach-O images loaded into the process, JavaScript profiles reference
/// the source maps of their bundles.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct DebugImage {
    #[serde(skip_serializing_if = "Option::is_none", alias = "name")]
    pub code_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "id")]
    pub debug_id: Option<String>,
    #[serde(rename = "type")]
    pub image_type: ImageType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_addr: Option<Addr>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_vmaddr: Option<Addr>,

    #[serde(
        default,
        deserialize_with = "utils::deserialize_number_from_string",
        skip_serializing_if = "utils::is_zero"
    )]
    pub image_size: u64,
}

impl DebugImage {
    /// Creates a source map image for a JavaScript bundle.
    pub fn source_map(code_file: impl Into<String>, debug_id: impl Into<String>) -> Self {
        Self {
            code_file: Some(code_file.into()),
            debug_id: Some(debug_id.into()),
            image_type: ImageType::Sourcemap,
            image_addr: None,
            image_vmaddr: None,
            image_size: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macho_image() {
        let image_json = r#"{"debug_id":"32420279-25E2-34E6-8BC7-8A006A8F2425","image_addr":"0x000000010258c000","code_file":"/private/var/containers/Bundle/Application/TrendingMovies.app/TrendingMovies","type":"macho","image_size":1720320,"image_vmaddr":"0x0000000100000000"}"#;
        let image: DebugImage = serde_json::from_str(image_json).unwrap();

        assert_eq!(image.image_type, ImageType::MachO);
        assert_eq!(image.image_addr, Some(Addr(0x10258c000)));
        assert_eq!(image.image_size, 1720320);

        let json = serde_json::to_string(&image).unwrap();
        assert_eq!(serde_json::from_str::<DebugImage>(&json).unwrap(), image);
        assert!(json.contains(r#""image_addr":"0x000000010258c000""#));
    }

    #[test]
    fn test_source_map_image() {
        let image = DebugImage::source_map("app:///main.jsbundle", "9c3ea6e3-0b1b-4ba2-9d2c-6a2b40a6f8d5");
        insta::assert_json_snapshot!(image, @r#"
        {
          "code_file": "app:///main.jsbundle",
          "debug_id": "9c3ea6e3-0b1b-4ba2-9d2c-6a2b40a6f8d5",
          "type": "sourcemap"
        }
        "#);
    }
}
