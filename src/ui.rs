use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Margin, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use crate::app::{Action, App, Focus, ResultKind};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [suggestion_area, clock_out_row, plan_area, submit_row, result_area] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Length(3),
        Constraint::Length(6),
        Constraint::Length(3),
        Constraint::Min(6),
    ])
    .areas(body_area);

    render_header(app, frame, header_area);
    render_suggestion(app, frame, suggestion_area);

    let clock_out_area = button_area(clock_out_row);
    app.clock_out_area = Some(clock_out_area);
    render_button(app, frame, clock_out_area, Action::ClockOut);

    app.plan_area = Some(plan_area);
    render_plan_input(app, frame, plan_area);

    let submit_area = button_area(submit_row);
    app.submit_area = Some(submit_area);
    render_button(app, frame, submit_area, Action::UpdateSchedule);

    app.result_area = Some(result_area);
    render_result(app, frame, result_area);
    render_footer(app, frame, footer_area);

    if app.alert.is_some() {
        render_alert(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Clock Out ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.base_url.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_suggestion(app: &App, frame: &mut Frame, area: Rect) {
    let title = if app.suggestion_loading() && !app.suggestion.is_empty() {
        format!(" Today's suggestion (refreshing{}) ", app.ellipsis())
    } else {
        " Today's suggestion ".to_string()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(title);

    let text_style = if app.suggestion.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let suggestion = Paragraph::new(app.suggestion_text().to_string())
        .style(text_style)
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(suggestion, area);
}

/// Buttons take a fixed width on the left of their row.
fn button_area(row: Rect) -> Rect {
    let [button, _] = Layout::horizontal([Constraint::Length(24), Constraint::Min(0)]).areas(row);
    button
}

fn render_button(app: &App, frame: &mut Frame, area: Rect, action: Action) {
    let focused = match action {
        Action::ClockOut => app.focus == Focus::ClockOut,
        Action::UpdateSchedule => app.focus == Focus::Submit,
    };
    let pending = app.is_pending(action);

    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let (label, style) = if pending {
        (
            format!("{}{}", action.pending_label(), app.ellipsis()),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )
    } else if focused {
        (
            action.label().to_string(),
            Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD),
        )
    } else {
        (action.label().to_string(), Style::default().fg(Color::White))
    };

    let button = Paragraph::new(Line::from(Span::styled(label, style)))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(button, area);
}

fn render_plan_input(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Focus::PlanInput;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Schedule plan ");
    let inner = block.inner(area);

    let (rows, (cursor_row, cursor_col)) =
        wrap_plan(&app.plan_input, app.plan_cursor, inner.width as usize);
    // Keep the cursor row visible
    let scroll = (cursor_row as u16).saturating_sub(inner.height.saturating_sub(1));

    let input = if app.plan_input.is_empty() && !focused {
        Paragraph::new("e.g. \"off tomorrow\", \"working next Saturday\", \"fill in June\"")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block)
    } else {
        let lines: Vec<Line> = rows.into_iter().map(Line::from).collect();
        Paragraph::new(lines).scroll((scroll, 0)).block(block)
    };
    frame.render_widget(input, area);

    if focused && inner.width > 0 && inner.height > 0 {
        let x = inner.x + (cursor_col as u16).min(inner.width - 1);
        let y = inner.y + (cursor_row as u16 - scroll).min(inner.height - 1);
        frame.set_cursor_position(Position::new(x, y));
    }
}

/// Hard-wrap the plan text at `width` display columns. Returns the visual
/// rows and the cursor's (row, column) among them.
fn wrap_plan(input: &str, cursor: usize, width: usize) -> (Vec<String>, (usize, usize)) {
    let width = width.max(1);
    let mut rows = vec![String::new()];
    let mut row_width = 0;
    let mut cursor_at = None;

    for (i, c) in input.chars().enumerate() {
        let w = c.width().unwrap_or(0);
        if c != '\n' && row_width > 0 && row_width + w > width {
            rows.push(String::new());
            row_width = 0;
        }
        if i == cursor {
            cursor_at = Some((rows.len() - 1, row_width));
        }
        if c == '\n' {
            rows.push(String::new());
            row_width = 0;
        } else if let Some(row) = rows.last_mut() {
            row.push(c);
            row_width += w;
        }
    }

    let cursor_at = cursor_at.unwrap_or_else(|| {
        // Cursor after the last char: a full row pushes it onto a fresh one
        if row_width >= width {
            rows.push(String::new());
            (rows.len() - 1, 0)
        } else {
            (rows.len() - 1, row_width)
        }
    });
    (rows, cursor_at)
}

/// Rows a wrapped paragraph of `text` takes at `width` columns.
fn wrapped_line_count(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    text.lines()
        .map(|line| (line.width() / width + 1) as u16)
        .sum()
}

fn render_result(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Result ");
    let inner = block.inner(area);

    let (text, style) = match &app.result {
        Some(result) => {
            let color = match result.kind {
                ResultKind::Success => Color::Green,
                ResultKind::Error => Color::Red,
                ResultKind::Failure => Color::Yellow,
            };
            (result.text.clone(), Style::default().fg(color))
        }
        None => ("No actions yet".to_string(), Style::default().fg(Color::DarkGray)),
    };

    // Store sizes for scroll bounds
    app.result_lines = wrapped_line_count(&text, inner.width);
    app.result_height = inner.height;
    app.result_scroll = app.result_scroll.min(app.result_lines.saturating_sub(app.result_height));

    let paragraph = Paragraph::new(text)
        .style(style)
        .wrap(Wrap { trim: false })
        .scroll((app.result_scroll, 0))
        .block(block);
    frame.render_widget(paragraph, area);

    if app.result_lines > app.result_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(app.result_lines as usize)
            .position(app.result_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin { vertical: 1, horizontal: 0 }),
            &mut scrollbar_state,
        );
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = if app.focus == Focus::PlanInput {
        (" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        (" READY ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if app.alert.is_some() {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" dismiss ", label_style),
        ]
    } else if app.focus == Focus::PlanInput {
        vec![
            Span::styled(" Ctrl-S ", key_style),
            Span::styled(" submit ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" newline ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" focus ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ]
    } else {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" press ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" focus ", label_style),
            Span::styled(" c ", key_style),
            Span::styled(" clock out ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" edit plan ", label_style),
            Span::styled(" r ", key_style),
            Span::styled(" refresh ", label_style),
            Span::styled(" PgUp/PgDn ", key_style),
            Span::styled(" result ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_alert(app: &App, frame: &mut Frame, area: Rect) {
    let message = app.alert.clone().unwrap_or_default();

    let popup_width = 50u16.min(area.width.saturating_sub(4));
    let popup_height = 6u16.min(area.height);
    let popup_area = Rect {
        x: area.x + (area.width.saturating_sub(popup_width)) / 2,
        y: area.y + (area.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Notice ");

    let text = vec![
        Line::from(message),
        Line::from(""),
        Line::from(Span::styled("Press Enter to dismiss", Style::default().fg(Color::DarkGray))),
    ];

    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(popup, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ActionOutcome, Suggestion};
    use crate::app::EMPTY_PLAN_ALERT;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &mut App) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    fn screen_contains(rows: &[String], needle: &str) -> bool {
        rows.iter().any(|row| row.contains(needle))
    }

    #[test]
    fn test_suggestion_shown_verbatim() {
        let mut app = App::new("http://localhost:3000");
        app.request_suggestion();
        app.apply_suggestion(1, Ok(Suggestion::Ready("Go home on time".to_string())));

        let rows = draw(&mut app);
        assert!(screen_contains(&rows, "Go home on time"));
    }

    #[test]
    fn test_pending_button_renders_disabled() {
        let mut app = App::new("http://localhost:3000");
        app.activate(Action::ClockOut);

        let rows = draw(&mut app);
        assert!(screen_contains(&rows, "Clocking out."));
        assert!(screen_contains(&rows, "Submit plan"));

        app.settle(Action::ClockOut, Ok(ActionOutcome { success: true, message: "ok".to_string() }));
        let rows = draw(&mut app);
        assert!(screen_contains(&rows, "Clock out"));
        assert!(!screen_contains(&rows, "Clocking out"));
        assert!(screen_contains(&rows, "Success: ok"));
    }

    #[test]
    fn test_render_records_button_areas() {
        let mut app = App::new("http://localhost:3000");
        draw(&mut app);
        let clock_out = app.clock_out_area.unwrap();
        let submit = app.submit_area.unwrap();
        assert!(clock_out.y < submit.y);
        assert_eq!(clock_out.width, 24);
    }

    #[test]
    fn test_alert_popup() {
        let mut app = App::new("http://localhost:3000");
        app.activate(Action::UpdateSchedule);
        let rows = draw(&mut app);
        assert!(screen_contains(&rows, "Notice"));
        assert!(screen_contains(&rows, "Press Enter to dismiss"));
        assert!(rows.concat().contains("Please enter your schedule"));
        assert!(app.alert.as_deref() == Some(EMPTY_PLAN_ALERT));
    }

    #[test]
    fn test_multiline_report_fully_visible() {
        let mut app = App::new("http://localhost:3000");
        app.activate(Action::ClockOut);
        let report = "下班时间: 19:02\n今日加班: 1.0 小时\n本月累计加班: 12.5 小时\n\n【智能建议】\nline6\nline7\nline8\n";
        app.settle(Action::ClockOut, Ok(ActionOutcome { success: true, message: report.to_string() }));

        let rows = draw(&mut app);
        // Wide chars are followed by blank cells in the buffer
        let screen = rows.concat().replace(' ', "");
        assert!(screen.contains("Success:下班时间:19:02"));
        for line in ["今日加班:1.0小时", "本月累计加班:12.5小时", "【智能建议】", "line6", "line7", "line8"] {
            assert!(screen.contains(line), "{line} missing from the result panel");
        }
    }

    #[test]
    fn test_long_result_scrolls_to_the_end() {
        let mut app = App::new("http://localhost:3000");
        app.activate(Action::ClockOut);
        let message = (1..=20).map(|n| format!("line{n}")).collect::<Vec<_>>().join("\n");
        app.settle(Action::ClockOut, Ok(ActionOutcome { success: false, message }));

        let rows = draw(&mut app);
        assert!(screen_contains(&rows, "Error: line1"));
        assert!(!screen_contains(&rows, "line20"));
        assert!(app.result_lines > app.result_height);

        app.scroll_result_page_down();
        app.scroll_result_page_down();
        app.scroll_result_page_down();
        let rows = draw(&mut app);
        assert!(screen_contains(&rows, "line20"));
        assert!(!screen_contains(&rows, "Error: line1"));
    }

    #[test]
    fn test_long_plan_wraps_with_tail_visible() {
        let mut app = App::new("http://localhost:3000");
        app.focus = Focus::PlanInput;
        app.plan_input = format!("{}TAILMARK", "x".repeat(90));
        app.plan_cursor = app.plan_input.chars().count();

        let rows = draw(&mut app);
        assert!(screen_contains(&rows, "TAILMARK"));
    }

    #[test]
    fn test_wrap_plan_tracks_cursor() {
        let (rows, cursor) = wrap_plan("abcdef", 6, 4);
        assert_eq!(rows, vec!["abcd", "ef"]);
        assert_eq!(cursor, (1, 2));

        // Cursor before a char that wraps lands at the start of the next row
        let (_, cursor) = wrap_plan("abcdef", 4, 4);
        assert_eq!(cursor, (1, 0));

        // A full last row moves the end cursor to a new row
        let (rows, cursor) = wrap_plan("abcd", 4, 4);
        assert_eq!(rows, vec!["abcd", ""]);
        assert_eq!(cursor, (1, 0));

        // Wide chars take two columns
        let (rows, cursor) = wrap_plan("ab\n明天休息", 7, 5);
        assert_eq!(rows, vec!["ab", "明天", "休息"]);
        assert_eq!(cursor, (2, 4));

        let (rows, cursor) = wrap_plan("", 0, 10);
        assert_eq!(rows, vec![""]);
        assert_eq!(cursor, (0, 0));
    }
}
