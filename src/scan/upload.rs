use crate::error::{ClientError, ClientResult};
use crate::scan::image::ImageRef;
use crate::scan::mode::ScanMode;
use crate::transport::{ApiRequest, FormPart};

/// Multipart request for the staged images; field and endpoint come from
/// the mode descriptor.
pub fn build_scan_request(mode: ScanMode, images: &[ImageRef]) -> ClientResult<ApiRequest> {
    let desc = mode.descriptor();
    if images.is_empty() {
        return Err(ClientError::InvalidState("no images staged"));
    }
    if images.len() > desc.max_images {
        return Err(ClientError::CapacityExceeded {
            mode: mode.as_str(),
            max: desc.max_images,
        });
    }

    let parts = images
        .iter()
        .enumerate()
        .map(|(i, image)| -> ClientResult<FormPart> {
            image.check()?;
            let file_name = if mode.is_multi_image() {
                format!("{}-{}.{}", desc.file_stem, i, image.extension())
            } else {
                format!("{}.{}", desc.file_stem, image.extension())
            };
            Ok(FormPart {
                field: desc.field,
                file_name,
                content_type: image.content_type.clone(),
                bytes: image.bytes.clone(),
            })
        })
        .collect::<ClientResult<Vec<_>>>()?;

    Ok(ApiRequest::multipart(desc.endpoint, parts))
}
