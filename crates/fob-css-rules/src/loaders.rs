//! Transform chains for CSS modules and global CSS.
//!
//! A chain is: the client style loader (client builds only), `css-loader`,
//! `postcss-loader`, then the pre-processor's own loaders. Loaders run right to
//! left, so the pre-processor output is what PostCSS sees.

use serde::Serialize;

use crate::bundler::UseItem;
use crate::context::ConfigurationContext;
use crate::error::Result;
use crate::postcss::PostCssPlugin;

pub const STYLE_LOADER: &str = "next-style-loader";
pub const EXTRACT_CSS_LOADER: &str = "mini-css-extract-plugin/loader";
pub const CSS_LOADER: &str = "css-loader";
pub const POSTCSS_LOADER: &str = "postcss-loader";

/// Element development styles are inserted in front of.
pub const STYLE_ANCHOR: &str = "#__next_css__DO_NOT_USE__";

/// Naming pattern for scoped class names.
pub const LOCAL_IDENT_NAME: &str = "[local]___[hash:base64:5]";

/// Which `url()` / `@import` references `css-loader` resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlFilter {
    /// Everything except root-relative (`/`-prefixed) URLs, which are served as is.
    SkipRootRelative,
}

impl UrlFilter {
    pub fn accepts(self, url: &str) -> bool {
        match self {
            UrlFilter::SkipRootRelative => !url.starts_with('/'),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleLoaderOptions {
    /// Insert `<style>` tags before the element matching this selector.
    pub insert_before: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractLoaderOptions {
    pub public_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CssLoaderOptions {
    pub import_loaders: usize,
    pub source_map: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub es_module: Option<bool>,
    pub url: UrlFilter,
    pub import: UrlFilter,
    pub modules: CssModules,
}

/// `false` for global CSS, scoping options for CSS modules.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CssModules {
    Disabled(bool),
    Enabled(CssModulesOptions),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CssModulesOptions {
    pub export_locals_convention: String,
    pub export_only_locals: bool,
    pub mode: String,
    pub local_ident_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCssLoaderOptions {
    pub postcss_options: PostCssOptions,
    pub source_map: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostCssOptions {
    pub plugins: Vec<PostCssPlugin>,
    /// Config files were already read; `postcss-loader` must not look again.
    pub config: bool,
}

/// Chain for CSS modules, scoped per importing file.
pub fn css_module_loader(
    ctx: &ConfigurationContext,
    postcss: &[PostCssPlugin],
    extra: &[UseItem],
) -> Result<Vec<UseItem>> {
    let modules = CssModules::Enabled(CssModulesOptions {
        export_locals_convention: "asIs".to_string(),
        export_only_locals: ctx.is_server,
        mode: "pure".to_string(),
        local_ident_name: LOCAL_IDENT_NAME.to_string(),
    });
    chain(ctx, postcss, extra, modules, Some(false))
}

/// Chain for global, unscoped CSS.
pub fn global_css_loader(
    ctx: &ConfigurationContext,
    postcss: &[PostCssPlugin],
    extra: &[UseItem],
) -> Result<Vec<UseItem>> {
    chain(ctx, postcss, extra, CssModules::Disabled(false), None)
}

fn chain(
    ctx: &ConfigurationContext,
    postcss: &[PostCssPlugin],
    extra: &[UseItem],
    modules: CssModules,
    es_module: Option<bool>,
) -> Result<Vec<UseItem>> {
    let mut loaders = Vec::with_capacity(3 + extra.len());

    if ctx.is_client {
        loaders.push(client_style_loader(ctx)?);
    }

    loaders.push(loader(
        CSS_LOADER,
        &CssLoaderOptions {
            import_loaders: 1 + extra.len(),
            source_map: true,
            es_module,
            url: UrlFilter::SkipRootRelative,
            import: UrlFilter::SkipRootRelative,
            modules,
        },
    )?);

    loaders.push(loader(
        POSTCSS_LOADER,
        &PostCssLoaderOptions {
            postcss_options: PostCssOptions {
                plugins: postcss.to_vec(),
                config: false,
            },
            source_map: true,
        },
    )?);

    loaders.extend_from_slice(extra);
    Ok(loaders)
}

fn client_style_loader(ctx: &ConfigurationContext) -> Result<UseItem> {
    if ctx.is_development {
        loader(
            STYLE_LOADER,
            &StyleLoaderOptions {
                insert_before: STYLE_ANCHOR.to_string(),
            },
        )
    } else {
        loader(
            EXTRACT_CSS_LOADER,
            &ExtractLoaderOptions {
                public_path: format!("{}/_next/", ctx.asset_prefix),
            },
        )
    }
}

fn loader(name: &str, options: &impl Serialize) -> Result<UseItem> {
    Ok(UseItem::with_options(name, serde_json::to_value(options)?))
}
