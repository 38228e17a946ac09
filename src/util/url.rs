use crate::Error;
use url::Url;

/// Parse a call URL. Only `http` and `https` are accepted.
pub(crate) fn parse_call_url(raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw.trim()).map_err(|err| Error::InvalidConfig {
        message: format!("invalid url: {raw}").into_boxed_str(),
        source: Some(Box::new(err)),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_config(format!(
            "unsupported url scheme: {}",
            url.scheme()
        )));
    }
    Ok(url)
}

pub(crate) fn sanitize_url_for_error(url: &Url) -> Url {
    let mut safe = url.clone();
    safe.set_query(None);
    safe.set_fragment(None);
    let _ = safe.set_username("");
    let _ = safe.set_password(None);
    safe
}
