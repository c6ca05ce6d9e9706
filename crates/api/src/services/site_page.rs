//! Server-rendered public site pages.
//!
//! Pages are self-contained HTML with inline styles so they render without
//! any frontend bundle. Every owner or visitor supplied value goes through
//! [`escape_html`].

use domain::models::{PublicSite, RsvpSubmission, SiteTheme};

/// Colors and font of a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub accent: &'static str,
    pub accent_text: &'static str,
    pub font: &'static str,
}

const SERIF: &str = "Georgia, 'Times New Roman', serif";
const SANS: &str = "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif";

pub fn palette(theme: SiteTheme) -> Palette {
    match theme {
        SiteTheme::Classic => Palette {
            background: "#ffffff",
            text: "#18181b",
            accent: "#18181b",
            accent_text: "#ffffff",
            font: SERIF,
        },
        SiteTheme::Boho => Palette {
            background: "#FAF3E0",
            text: "#5D4037",
            accent: "#D4A373",
            accent_text: "#ffffff",
            font: SERIF,
        },
        SiteTheme::Modern => Palette {
            background: "#09090b",
            text: "#ffffff",
            accent: "#dc2626",
            accent_text: "#ffffff",
            font: SANS,
        },
    }
}

/// Feedback shown above the RSVP form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Everything needed to render one public site page.
#[derive(Debug, Clone)]
pub struct SitePage<'a> {
    pub site: &'a PublicSite,
    /// Where the RSVP form posts to.
    pub rsvp_action: String,
    /// Set when the visitor is the signed-in owner.
    pub editor_url: Option<&'a str>,
    pub notice: Option<Notice>,
    /// Values to prefill after a rejected submission.
    pub form: Option<&'a RsvpSubmission>,
    /// Hide the form once the visitor is confirmed.
    pub rsvp_done: bool,
}

impl<'a> SitePage<'a> {
    pub fn new(site: &'a PublicSite, rsvp_action: String) -> Self {
        Self {
            site,
            rsvp_action,
            editor_url: None,
            notice: None,
            form: None,
            rsvp_done: false,
        }
    }

    pub fn render(&self) -> String {
        let content = &self.site.content;
        let theme = palette(content.theme);
        let couple = format!(
            "{} &amp; {}",
            escape_html(&content.bride_name),
            escape_html(&content.groom_name)
        );

        format!(
            r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{couple}</title>
</head>
<body style="margin: 0; background: {bg}; color: {text}; font-family: {font}; line-height: 1.6;">
{editor}    <header style="position: relative; min-height: 80vh; display: flex; flex-direction: column; align-items: center; justify-content: center; text-align: center; padding: 32px; overflow: hidden;">
{hero}        <div style="position: relative;">
            <h1 style="font-size: 64px; font-weight: normal; margin: 0;">{couple}</h1>
            <p style="font-size: 20px; text-transform: uppercase; letter-spacing: 0.3em;">{headline}</p>
{when}{location}            <div style="margin-top: 32px;">
{cta}{map}            </div>
        </div>
    </header>
    <main style="max-width: 896px; margin: 0 auto; padding: 64px 32px; text-align: center;">
{story}{album}{rsvp}    </main>
</body>
</html>"#,
            couple = couple,
            bg = theme.background,
            text = theme.text,
            font = theme.font,
            editor = self.editor_button(),
            hero = hero_image(&content.hero_image),
            headline = escape_html(&content.headline),
            when = event_when(self.site),
            location = if content.location_name.is_empty() {
                String::new()
            } else {
                format!(
                    "            <p style=\"opacity: 0.7;\">{}</p>\n",
                    escape_html(&content.location_name)
                )
            },
            cta = if content.rsvp_enabled {
                format!(
                    "                <a href=\"#rsvp\" style=\"{}\">Confirmar Presença</a>\n",
                    button_style(&theme)
                )
            } else {
                String::new()
            },
            map = if content.location_map_url.is_empty() {
                String::new()
            } else {
                format!(
                    "                <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" style=\"{}\">Ver Mapa</a>\n",
                    escape_html(&content.location_map_url),
                    outline_style(&theme)
                )
            },
            story = story_section(&content.story),
            album = album_section(&content.album),
            rsvp = self.rsvp_section(&theme),
        )
    }

    fn editor_button(&self) -> String {
        match self.editor_url {
            Some(url) => format!(
                "    <a href=\"{}\" style=\"position: fixed; top: 24px; left: 50%; transform: translateX(-50%); z-index: 10; background: rgba(0,0,0,0.6); color: #fff; padding: 12px 24px; border-radius: 999px; text-decoration: none; font-family: {};\">&larr; Voltar ao Editor</a>\n",
                escape_html(url),
                SANS
            ),
            None => String::new(),
        }
    }

    fn rsvp_section(&self, theme: &Palette) -> String {
        if !self.site.content.rsvp_enabled {
            return String::new();
        }

        let notice = match &self.notice {
            Some(Notice::Success(msg)) => format!(
                "            <p role=\"status\" style=\"background: rgba(16,185,129,0.12); color: #059669; padding: 16px; border-radius: 16px; font-weight: bold;\">{}</p>\n",
                escape_html(msg)
            ),
            Some(Notice::Error(msg)) => format!(
                "            <p role=\"alert\" style=\"background: rgba(220,38,38,0.12); color: #dc2626; padding: 16px; border-radius: 16px; font-weight: bold;\">{}</p>\n",
                escape_html(msg)
            ),
            None => String::new(),
        };

        if self.rsvp_done {
            return format!(
                r#"        <section id="rsvp" style="padding-top: 64px;">
            <h2 style="font-size: 36px; font-style: italic;">Esperamos por você!</h2>
{notice}        </section>
"#,
                notice = notice
            );
        }

        let input = self.form;
        let declined = input.is_some_and(|i| !i.confirmed);
        let field = "width: 100%; box-sizing: border-box; padding: 16px; border-radius: 16px; border: 1px solid rgba(128,128,128,0.4); font-size: 16px; margin-top: 4px;";

        format!(
            r#"        <section id="rsvp" style="padding-top: 64px;">
            <h2 style="font-size: 36px; font-style: italic;">Esperamos por você!</h2>
{notice}            <form method="post" action="{action}" style="max-width: 480px; margin: 0 auto; text-align: left;">
                <label style="display: block; margin-bottom: 16px;">Seu Nome Completo
                    <input name="guestName" required maxlength="120" value="{name}" placeholder="Ex: Maria Souza" style="{field}">
                </label>
                <label style="display: block; margin-bottom: 16px;">Seu WhatsApp
                    <input name="phone" required value="{phone}" placeholder="(11) 99999-9999" style="{field}">
                </label>
                <label style="display: block; margin-bottom: 16px;">E-mail (opcional)
                    <input name="email" type="email" value="{email}" style="{field}">
                </label>
                <label style="display: block; margin-bottom: 16px;">Mensagem aos noivos (opcional)
                    <textarea name="message" maxlength="1000" rows="3" style="{field}">{message}</textarea>
                </label>
                <label style="display: block; margin-bottom: 24px;">Você vai comparecer?
                    <select name="confirmed" style="{field}">
                        <option value="true"{yes}>Sim, estarei presente</option>
                        <option value="false"{no}>Não poderei ir</option>
                    </select>
                </label>
                <button type="submit" style="{button} width: 100%; border: none; cursor: pointer;">Confirmar Agora</button>
            </form>
        </section>
"#,
            notice = notice,
            action = escape_html(&self.rsvp_action),
            name = input.map(|i| escape_html(&i.guest_name)).unwrap_or_default(),
            phone = input.map(|i| escape_html(&i.phone)).unwrap_or_default(),
            email = input
                .and_then(|i| i.email.as_deref())
                .map(escape_html)
                .unwrap_or_default(),
            message = input
                .and_then(|i| i.message.as_deref())
                .map(escape_html)
                .unwrap_or_default(),
            yes = if declined { "" } else { " selected" },
            no = if declined { " selected" } else { "" },
            field = field,
            button = button_style(theme),
        )
    }
}

fn button_style(theme: &Palette) -> String {
    format!(
        "display: inline-block; background: {}; color: {}; padding: 18px 40px; border-radius: 999px; text-decoration: none; text-transform: uppercase; letter-spacing: 0.1em; font-weight: bold; font-size: 14px; margin: 8px;",
        theme.accent, theme.accent_text
    )
}

fn outline_style(theme: &Palette) -> String {
    format!(
        "display: inline-block; color: {}; padding: 18px 40px; border-radius: 999px; border: 1px solid currentColor; text-decoration: none; text-transform: uppercase; letter-spacing: 0.1em; font-weight: bold; font-size: 14px; margin: 8px;",
        theme.text
    )
}

fn hero_image(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    format!(
        "        <img src=\"{}\" alt=\"\" style=\"position: absolute; inset: 0; width: 100%; height: 100%; object-fit: cover; opacity: 0.4;\">\n",
        escape_html(url)
    )
}

/// "15/05/2025 às 18:00", pt-BR style.
fn event_when(site: &PublicSite) -> String {
    let content = &site.content;
    let text = match (content.event_date, content.event_time) {
        (Some(date), Some(time)) => format!("{} às {}", date.format("%d/%m/%Y"), time.format("%H:%M")),
        (Some(date), None) => date.format("%d/%m/%Y").to_string(),
        (None, Some(time)) => time.format("%H:%M").to_string(),
        (None, None) => return String::new(),
    };
    format!(
        "            <p style=\"font-size: 20px; font-weight: bold; margin-bottom: 0;\">{}</p>\n",
        text
    )
}

fn story_section(story: &str) -> String {
    if story.trim().is_empty() {
        return String::new();
    }
    format!(
        r#"        <section>
            <h2 style="font-size: 48px; font-weight: normal;">Nossa História</h2>
            <p style="font-size: 20px; opacity: 0.8; white-space: pre-wrap;">{}</p>
        </section>
"#,
        escape_html(story)
    )
}

fn album_section(album: &[String]) -> String {
    if album.is_empty() {
        return String::new();
    }
    let photos: String = album
        .iter()
        .map(|url| {
            format!(
                "                <img src=\"{}\" alt=\"\" loading=\"lazy\" style=\"width: 100%; aspect-ratio: 4 / 5; object-fit: cover; border-radius: 24px;\">\n",
                escape_html(url)
            )
        })
        .collect();
    format!(
        r#"        <section style="padding-top: 64px;">
            <h2 style="font-size: 48px; font-weight: normal;">Galeria</h2>
            <div style="display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 24px;">
{}            </div>
        </section>
"#,
        photos
    )
}

/// Page for a slug no site answers to.
pub fn render_not_found(slug: &str) -> String {
    message_page(
        "Site não encontrado",
        &format!(
            "Nenhum site de casamento responde pelo endereço <strong>{}</strong>. Confira o link com os noivos.",
            escape_html(slug)
        ),
    )
}

/// Page shown when the site could not be loaded or the action failed.
pub fn render_error(message: &str) -> String {
    message_page("Algo deu errado", &escape_html(message))
}

/// `body` is trusted markup; callers escape their inputs.
fn message_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body style="margin: 0; min-height: 100vh; display: flex; align-items: center; justify-content: center; background: #09090b; color: #ffffff; font-family: {font}; text-align: center;">
    <div style="padding: 32px; max-width: 560px;">
        <h1 style="font-size: 40px; margin-bottom: 8px;">{title}</h1>
        <p style="opacity: 0.7;">{body}</p>
    </div>
</body>
</html>"#,
        title = title,
        font = SANS,
        body = body
    )
}

/// Escapes text for HTML element content and quoted attribute values.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use domain::models::SiteContent;

    fn site(theme: SiteTheme) -> PublicSite {
        PublicSite {
            content: SiteContent {
                slug: "ana-e-joao".into(),
                theme,
                bride_name: "Ana".into(),
                groom_name: "João".into(),
                event_date: NaiveDate::from_ymd_opt(2025, 5, 15),
                event_time: NaiveTime::from_hms_opt(18, 0, 0),
                location_name: "Villa dos Lagos".into(),
                headline: "Nossa Contagem Regressiva".into(),
                story: "Nossa história começou há 5 anos...".into(),
                album: vec!["/media/a.jpg".into()],
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
        assert_eq!(escape_html("Ana"), "Ana");
    }

    #[test]
    fn test_render_contains_content() {
        let site = site(SiteTheme::Classic);
        let html = SitePage::new(&site, "/sites/ana-e-joao/rsvp".into()).render();

        assert!(html.contains("Ana &amp; João"));
        assert!(html.contains("15/05/2025 às 18:00"));
        assert!(html.contains("Villa dos Lagos"));
        assert!(html.contains("Nossa História"));
        assert!(html.contains("Galeria"));
        assert!(html.contains("Confirmar Presença"));
        assert!(html.contains(r#"action="/sites/ana-e-joao/rsvp""#));
        assert!(!html.contains("Voltar ao Editor"));
        assert!(!html.contains("Ver Mapa"));
    }

    #[test]
    fn test_themes_use_their_palette() {
        let boho = site(SiteTheme::Boho);
        assert!(SitePage::new(&boho, String::new()).render().contains("#FAF3E0"));

        let modern = site(SiteTheme::Modern);
        assert!(SitePage::new(&modern, String::new()).render().contains("#dc2626"));
    }

    #[test]
    fn test_owner_content_is_escaped() {
        let mut site = site(SiteTheme::Classic);
        site.content.story = "<img src=x onerror=alert(1)>".into();
        let html = SitePage::new(&site, String::new()).render();

        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    }

    #[test]
    fn test_closed_rsvp_has_no_form() {
        let mut site = site(SiteTheme::Classic);
        site.content.rsvp_enabled = false;
        let html = SitePage::new(&site, "/sites/ana-e-joao/rsvp".into()).render();

        assert!(!html.contains("<form"));
        assert!(!html.contains("Confirmar Presença"));
    }

    #[test]
    fn test_rejected_form_keeps_input() {
        let site = site(SiteTheme::Classic);
        let input = RsvpSubmission {
            guest_name: "Maria Souza".into(),
            phone: "12".into(),
            email: None,
            message: Some("Parabéns!".into()),
            confirmed: false,
        };
        let mut page = SitePage::new(&site, "/sites/ana-e-joao/rsvp".into());
        page.form = Some(&input);
        page.notice = Some(Notice::Error("phone: Invalid phone number".into()));
        let html = page.render();

        assert!(html.contains(r#"value="Maria Souza""#));
        assert!(html.contains(r#"value="12""#));
        assert!(html.contains("Parabéns!</textarea>"));
        assert!(html.contains(r#"<option value="false" selected>"#));
        assert!(html.contains("phone: Invalid phone number"));
    }

    #[test]
    fn test_done_page_hides_form() {
        let site = site(SiteTheme::Classic);
        let mut page = SitePage::new(&site, String::new());
        page.rsvp_done = true;
        page.notice = Some(Notice::Success("Presença confirmada!".into()));
        let html = page.render();

        assert!(!html.contains("<form"));
        assert!(html.contains("Presença confirmada!"));
    }

    #[test]
    fn test_owner_sees_editor_link() {
        let site = site(SiteTheme::Classic);
        let mut page = SitePage::new(&site, String::new());
        page.editor_url = Some("/app/site");

        assert!(page.render().contains(r#"href="/app/site""#));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let html = render_error("<script>");
        assert!(html.contains("Algo deu errado"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_not_found_page_escapes_slug() {
        let html = render_not_found("<b>x</b>");
        assert!(html.contains("Site não encontrado"));
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
    }
}
