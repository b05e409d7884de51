use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Clear, Paragraph, Wrap};

use crate::severity::{extract_severity, RiskTier};

use super::app::{AppState, ClassificationOutcome, Focus, ViewMode};
use super::format::{format_raw_payload, format_received_at, format_round_trip};
use super::text::{truncate_with_ellipsis, wrap_text_lines};
use super::theme::{Theme, ValueStyle};

pub(crate) fn draw_ui(frame: &mut ratatui::Frame, app: &mut AppState) {
    if app.view_mode == ViewMode::RawFullscreen {
        draw_raw_fullscreen(frame, app);
        return;
    }

    let theme = Theme::dark();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(40),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header_line = Line::from(vec![
        Span::styled("Endpoint: ", theme.key_style()),
        Span::styled(app.endpoint.as_str(), theme.value_style(ValueStyle::Important)),
        Span::styled("  Status: ", theme.key_style()),
        if app.connected {
            Span::styled("live", theme.ok_style())
        } else {
            Span::styled("offline", theme.warn_style())
        },
    ]);
    let header = Paragraph::new(header_line)
        .block(theme.block("Classifier"))
        .style(theme.value_style(ValueStyle::Normal));
    frame.render_widget(header, chunks[0]);

    let prompts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    draw_prompt_pane(
        frame,
        &theme,
        app,
        Focus::SystemPrompt,
        "System Prompt",
        prompts[0],
    );
    draw_prompt_pane(
        frame,
        &theme,
        app,
        Focus::UserPrompt,
        "User Prompt",
        prompts[1],
    );

    let result_block = theme.block("Classification");
    let result_inner = result_block.inner(chunks[2]);
    let details = if app.is_loading() {
        Text::from(vec![
            Line::styled("Analyzing...", theme.accent_style()),
            Line::styled("Esc cancels the request", theme.help_style()),
        ])
    } else {
        app.last_result
            .as_ref()
            .map(|outcome| result_details(&theme, outcome, result_inner.width))
            .unwrap_or_else(|| {
                Text::from(Line::styled(
                    "no classification yet",
                    theme.value_style(ValueStyle::Dim),
                ))
            })
    };
    let result_widget = Paragraph::new(details)
        .block(result_block)
        .style(theme.value_style(ValueStyle::Normal))
        .wrap(Wrap { trim: false });
    frame.render_widget(Clear, chunks[2]);
    frame.render_widget(result_widget, chunks[2]);

    let mut footer_spans = vec![Span::styled(
        "Tab=focus  Ctrl+S=analyze  Ctrl+R=raw  Ctrl+U=clear  Esc=cancel  Ctrl+Q=quit  ",
        theme.help_style(),
    )];
    if app.confirm_quit {
        footer_spans.push(Span::styled(
            "press Ctrl+Q again to quit / Esc to stay  ",
            theme.warn_style(),
        ));
    }
    if let Some(status) = &app.status {
        let style = if status.warn {
            theme.warn_style()
        } else {
            theme.accent_style()
        };
        footer_spans.push(Span::styled(status.text.as_str(), style));
    }
    let footer = Paragraph::new(Line::from(footer_spans)).block(theme.block("Controls"));
    frame.render_widget(footer, chunks[3]);
}

fn draw_prompt_pane(
    frame: &mut ratatui::Frame,
    theme: &Theme,
    app: &AppState,
    pane: Focus,
    title: &str,
    area: ratatui::layout::Rect,
) {
    let focused = app.focus == pane;
    let editor = match pane {
        Focus::SystemPrompt => &app.system_prompt,
        Focus::UserPrompt => &app.user_prompt,
    };
    let block = if focused {
        theme.focused_block(title)
    } else {
        theme.block(title)
    };
    let body = if editor.as_str().is_empty() && !focused {
        Text::from(Line::styled(
            "enter prompt...",
            theme.value_style(ValueStyle::Dim),
        ))
    } else {
        Text::from(editor.as_str())
    };
    let pane_widget = Paragraph::new(body)
        .block(block)
        .style(theme.value_style(ValueStyle::Normal))
        .wrap(Wrap { trim: false });
    frame.render_widget(pane_widget, area);
}

fn result_details(theme: &Theme, outcome: &ClassificationOutcome, width: u16) -> Text<'static> {
    let label = outcome.envelope.label.as_str();
    let tier = RiskTier::for_label(label);
    let severity = extract_severity(label);
    let max_label = (width.max(12) as usize).saturating_sub(10);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} {}", tier.glyph(), tier.level()),
                theme.tier_style(tier),
            ),
            Span::styled("   Severity Score: ", theme.key_style()),
            Span::styled(format!("{severity:.1}"), theme.tier_style(tier)),
        ]),
        Line::styled(tier.description().to_string(), theme.value_style(ValueStyle::Normal)),
        Line::from(vec![
            Span::styled("Label: ", theme.key_style()),
            Span::styled(
                truncate_with_ellipsis(label, max_label),
                theme.value_style(ValueStyle::Normal),
            ),
        ]),
    ];

    let mut status_spans = vec![
        Span::styled("Status: ", theme.key_style()),
        Span::styled("complete", theme.ok_style()),
    ];
    if let Some(round_trip) = outcome.round_trip {
        status_spans.push(Span::styled(
            format!("  in {}", format_round_trip(round_trip)),
            theme.value_style(ValueStyle::Dim),
        ));
    }
    status_spans.push(Span::styled(
        format!("  at {}", format_received_at(outcome.received_at)),
        theme.value_style(ValueStyle::Dim),
    ));
    lines.push(Line::from(status_spans));
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "Ctrl+R opens the raw result payload",
        theme.help_style(),
    ));
    Text::from(lines)
}

fn draw_raw_fullscreen(frame: &mut ratatui::Frame, app: &mut AppState) {
    let theme = Theme::dark();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(frame.area());

    let raw = app
        .last_result
        .as_ref()
        .map(format_raw_payload)
        .unwrap_or_else(|| "no result yet".to_string());

    let raw_block = theme.block("Raw Result (fullscreen)");
    let inner = raw_block.inner(chunks[0]);
    let wrapped = wrap_text_lines(&raw, inner.width.max(1) as usize);
    app.set_result_metrics(wrapped.len(), inner.height);
    let rendered = wrapped.join("\n");

    let raw_panel = Paragraph::new(rendered)
        .block(raw_block)
        .style(theme.value_style(ValueStyle::Normal))
        .scroll((app.result_scroll as u16, 0));
    frame.render_widget(raw_panel, chunks[0]);

    let mut footer_spans = vec![Span::styled(
        "j/k=scroll  gg/G=top/bottom  Ctrl+f/b=page  R/Esc=back  Q=quit  ",
        theme.help_style(),
    )];
    if app.confirm_quit {
        footer_spans.push(Span::styled(
            "press Q again to quit / Esc to stay  ",
            theme.warn_style(),
        ));
    }
    footer_spans.push(Span::styled(
        format!(
            "line {}/{}",
            app.result_scroll.saturating_add(1),
            app.result_total_lines
        ),
        theme.accent_style(),
    ));
    let footer = Paragraph::new(Line::from(footer_spans)).block(theme.block("Controls"));
    frame.render_widget(footer, chunks[1]);
}
