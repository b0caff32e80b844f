//! Askama templates for outbound mail. Each message ships a plain-text and
//! an HTML rendition; the render helpers return both as `(text, html)`.

use askama::Template;
use soma_core::NewsletterStage;

#[derive(Template)]
#[template(path = "emails/reset_password.txt")]
struct ResetPasswordText<'a> {
    first_name: &'a str,
    reset_url: &'a str,
}

#[derive(Template)]
#[template(path = "emails/reset_password.html")]
struct ResetPasswordHtml<'a> {
    first_name: &'a str,
    reset_url: &'a str,
}

#[derive(Template)]
#[template(path = "emails/newsletter_thank_you.txt")]
struct ThankYouText;

#[derive(Template)]
#[template(path = "emails/newsletter_thank_you.html")]
struct ThankYouHtml;

#[derive(Template)]
#[template(path = "emails/newsletter_stage_one.txt")]
struct StageOneText;

#[derive(Template)]
#[template(path = "emails/newsletter_stage_one.html")]
struct StageOneHtml;

#[derive(Template)]
#[template(path = "emails/newsletter_stage_two.txt")]
struct StageTwoText;

#[derive(Template)]
#[template(path = "emails/newsletter_stage_two.html")]
struct StageTwoHtml;

#[derive(Template)]
#[template(path = "emails/newsletter_stage_three.txt")]
struct StageThreeText;

#[derive(Template)]
#[template(path = "emails/newsletter_stage_three.html")]
struct StageThreeHtml;

#[derive(Template)]
#[template(path = "emails/composed.txt")]
struct ComposedText<'a> {
    body: &'a str,
    closing: &'a str,
    signature: &'a str,
}

#[derive(Template)]
#[template(path = "emails/composed.html")]
struct ComposedHtml<'a> {
    body: &'a str,
    closing: &'a str,
    signature: &'a str,
}

pub fn render_reset_password(
    first_name: &str,
    reset_url: &str,
) -> Result<(String, String), String> {
    let text = ResetPasswordText {
        first_name,
        reset_url,
    }
    .render()
    .map_err(|e| e.to_string())?;
    let html = ResetPasswordHtml {
        first_name,
        reset_url,
    }
    .render()
    .map_err(|e| e.to_string())?;
    Ok((text, html))
}

pub fn render_thank_you() -> Result<(String, String), String> {
    let text = ThankYouText.render().map_err(|e| e.to_string())?;
    let html = ThankYouHtml.render().map_err(|e| e.to_string())?;
    Ok((text, html))
}

pub fn render_newsletter_stage(stage: NewsletterStage) -> Result<(String, String), String> {
    let (text, html) = match stage {
        NewsletterStage::First => (StageOneText.render(), StageOneHtml.render()),
        NewsletterStage::Second => (StageTwoText.render(), StageTwoHtml.render()),
        NewsletterStage::Third => (StageThreeText.render(), StageThreeHtml.render()),
    };
    Ok((
        text.map_err(|e| e.to_string())?,
        html.map_err(|e| e.to_string())?,
    ))
}

pub fn render_composed(
    body: &str,
    closing: &str,
    signature: &str,
) -> Result<(String, String), String> {
    let text = ComposedText {
        body,
        closing,
        signature,
    }
    .render()
    .map_err(|e| e.to_string())?;
    let html = ComposedHtml {
        body,
        closing,
        signature,
    }
    .render()
    .map_err(|e| e.to_string())?;
    Ok((text, html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_email_contains_the_link_in_both_renditions() {
        let (text, html) =
            render_reset_password("Jane", "https://somasoma.com/reset/abc").unwrap();
        assert!(text.contains("https://somasoma.com/reset/abc"));
        assert!(html.contains(r#"href="https://somasoma.com/reset/abc""#));
        assert!(text.contains("Jane"));
    }

    #[test]
    fn every_stage_renders() {
        for stage in [
            NewsletterStage::First,
            NewsletterStage::Second,
            NewsletterStage::Third,
        ] {
            let (text, html) = render_newsletter_stage(stage).unwrap();
            assert!(!text.is_empty());
            assert!(!html.is_empty());
        }
    }

    #[test]
    fn composed_email_stitches_the_draft_parts_together() {
        let (text, html) =
            render_composed("Classes resume on Monday.", "Kind Regards", "somaSOMA").unwrap();
        assert!(text.contains("Classes resume on Monday."));
        assert!(text.contains("Kind Regards,\nsomaSOMA"));
        assert!(html.contains("Classes resume on Monday."));
    }
}
