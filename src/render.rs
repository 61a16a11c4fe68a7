//! Dockerfile templates and rendering

use crate::release::{ReleaseFamily, ReleaseTag};

pub const RUST_VERSION_PLACEHOLDER: &str = "$RUST_VERSION";
pub const SOLANA_VERSION_PLACEHOLDER: &str = "$SOLANA_VERSION";
pub const AGAVE_VERSION_PLACEHOLDER: &str = "$AGAVE_VERSION";

/// Solana releases from 1.15 on
const SOLANA_TEMPLATE: &str = r#"
FROM --platform=linux/amd64 rust@$RUST_VERSION

RUN apt-get update && apt-get install -qy git gnutls-bin
RUN sh -c "$(curl -sSfL https://release.solana.com/$SOLANA_VERSION/install)"
ENV PATH="/root/.local/share/solana/install/active_release/bin:$PATH"
WORKDIR /build

CMD /bin/bash
"#;

/// Solana releases before 1.15; their own installer is broken, so a newer
/// installer is patched to install the requested version
const SOLANA_PRE_FIFTEEN_TEMPLATE: &str = r#"
FROM --platform=linux/amd64 rust@$RUST_VERSION

RUN apt-get update && apt-get install -qy git gnutls-bin curl

# Download and modify the Solana install script to install the specified version
RUN curl -sSfL "https://release.solana.com/v1.18.20/install" -o solana_install.sh && \
    chmod +x solana_install.sh && \
    sed -i "s/^SOLANA_INSTALL_INIT_ARGS=.*/SOLANA_INSTALL_INIT_ARGS=$SOLANA_VERSION/" solana_install.sh && \
    ./solana_install.sh && \
    rm solana_install.sh

ENV PATH="/root/.local/share/solana/install/active_release/bin:$PATH"
WORKDIR /build
CMD /bin/bash
"#;

const AGAVE_TEMPLATE: &str = r#"
FROM --platform=linux/amd64 rust@$RUST_VERSION

RUN apt-get update && apt-get install -qy git gnutls-bin
RUN sh -c "$(curl -sSfL https://release.anza.xyz/$AGAVE_VERSION/install)"
ENV PATH="/root/.local/share/solana/install/active_release/bin:$PATH"
WORKDIR /build

CMD /bin/bash
"#;

/// A Dockerfile template and the placeholder its release version goes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub text: &'static str,
    pub version_placeholder: &'static str,
}

impl ReleaseFamily {
    pub fn template(&self) -> Template {
        match self {
            ReleaseFamily::PreFifteen => Template {
                text: SOLANA_PRE_FIFTEEN_TEMPLATE,
                version_placeholder: SOLANA_VERSION_PLACEHOLDER,
            },
            ReleaseFamily::SolanaStandard => Template {
                text: SOLANA_TEMPLATE,
                version_placeholder: SOLANA_VERSION_PLACEHOLDER,
            },
            ReleaseFamily::Agave => Template {
                text: AGAVE_TEMPLATE,
                version_placeholder: AGAVE_VERSION_PLACEHOLDER,
            },
        }
    }
}

/// Render the Dockerfile of `tag` on top of the compiler image `digest`
pub fn render(family: ReleaseFamily, digest: &str, tag: &ReleaseTag) -> String {
    let template = family.template();
    template
        .text
        .replace(template.version_placeholder, tag.raw())
        .replace(RUST_VERSION_PLACEHOLDER, digest)
        .trim_start_matches('\n')
        .to_string()
}
