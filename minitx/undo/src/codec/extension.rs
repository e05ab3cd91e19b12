//! Discovery and installation of externally supplied value codecs.
//!
//! Providers are registered through the process-wide registration surface
//! before the envelope codec initializes, analogous to a plugin directory
//! scanned at startup. Each provider is installed independently; having no
//! providers at all is a normal deployment.

use std::sync::{Arc, LazyLock};

use minitx_common::codec::{CodecRegistry, ValueDecoder, ValueEncoder};
use parking_lot::RwLock;

/// An externally supplied codec for one concrete value type.
///
/// Either half may be absent; only the halves a provider supplies are
/// installed for its type tag.
pub trait CodecProvider: Send + Sync {
    /// Type identifier of the target value type.
    fn type_tag(&self) -> &str;

    fn encoder(&self) -> Option<Arc<dyn ValueEncoder>>;

    fn decoder(&self) -> Option<Arc<dyn ValueDecoder>>;
}

static CODEC_PROVIDERS: LazyLock<RwLock<Vec<Arc<dyn CodecProvider>>>> =
    LazyLock::new(|| RwLock::new(Vec::new()));

/// Register a codec provider. Must happen before the envelope codec's
/// `init` for the provider to be discovered.
pub fn register_codec_provider(provider: Arc<dyn CodecProvider>) {
    CODEC_PROVIDERS.write().push(provider);
}

/// Install every discovered provider into `registry`.
///
/// An empty provider set is logged at warning level and treated as "zero
/// extensions installed", never as a failure.
pub(crate) fn discover_external_codecs(registry: &mut CodecRegistry) {
    let providers = CODEC_PROVIDERS.read();
    if providers.is_empty() {
        tracing::warn!("no external codec providers registered");
        return;
    }
    for provider in providers.iter() {
        let tag = provider.type_tag();
        if tag.is_empty() {
            continue;
        }
        if let Some(encoder) = provider.encoder() {
            registry.install_encoder(tag, encoder);
        }
        if let Some(decoder) = provider.decoder() {
            registry.install_decoder(tag, decoder);
        }
        tracing::info!(tag, "installed external value codec");
    }
}

#[cfg(test)]
mod tests {
    use minitx_common::error::CodecResult;
    use minitx_common::value::CellValue;
    use serde_json::Value as JsonValue;

    use super::*;

    struct NoopEncoder;

    impl ValueEncoder for NoopEncoder {
        fn encode(&self, _value: &CellValue) -> CodecResult<JsonValue> {
            Ok(JsonValue::Null)
        }
    }

    struct EncoderOnlyProvider;

    impl CodecProvider for EncoderOnlyProvider {
        fn type_tag(&self) -> &str {
            "test.EncoderOnly"
        }

        fn encoder(&self) -> Option<Arc<dyn ValueEncoder>> {
            Some(Arc::new(NoopEncoder))
        }

        fn decoder(&self) -> Option<Arc<dyn ValueDecoder>> {
            None
        }
    }

    #[test]
    fn test_provider_halves_install_independently() {
        register_codec_provider(Arc::new(EncoderOnlyProvider));

        let mut registry = CodecRegistry::new();
        discover_external_codecs(&mut registry);
        assert!(registry.has_encoder("test.EncoderOnly"));
        assert!(!registry.has_decoder("test.EncoderOnly"));
    }
}
