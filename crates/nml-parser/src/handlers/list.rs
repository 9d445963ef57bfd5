/*
 * handlers/list.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::error::{ErrorKind, ParseResult};
use crate::pattern::CachedMatch;
use crate::scanner::Scanner;
use crate::state::ListFrame;
use crate::token::{read_continued, skip_blanks};
use nml_syntax::{Bullet, Element, ListBegin, ListEnd, ListEntry, OrderedBullet};

const CATEGORY: &str = "Invalid List Entry";

impl Scanner<'_, '_> {
    /// A bullet line. Each marker character is one depth level: `-` opens
    /// an unordered frame and `*` an ordered one.
    pub(super) fn handle_list(&mut self, prev: usize, found: &CachedMatch) -> ParseResult<usize> {
        let content = self.content();
        let line_start = self.enter_line(prev, found.start);
        let markers_start = skip_blanks(content, line_start, found.end());
        let markers: Vec<bool> = content[markers_start..found.end()]
            .chars()
            .take_while(|c| *c == '-' || *c == '*')
            .map(|c| c == '*')
            .collect();

        // Keep the frames shared with the marker run
        let common = self
            .state
            .lists
            .iter()
            .zip(&markers)
            .take_while(|(frame, ordered)| frame.ordered == **ordered)
            .count();
        if self.state.lists.len() > common {
            while self.state.lists.len() > common {
                if let Some(frame) = self.state.lists.pop() {
                    self.doc.push(Element::ListEnd(ListEnd {
                        ordered: frame.ordered,
                    }));
                }
            }
            if self.state.lists.is_empty() {
                self.clear_bullet_variables();
            }
        }

        let mut counter = self.state.lists.last().map_or(1, |frame| frame.counter);
        let mut custom_counter = false;
        if let Some(value) = self.resolve("BulletCounter") {
            counter = value.trim().parse().map_err(|_| {
                self.error(
                    ErrorKind::InvalidNumbering,
                    found.start,
                    found.len,
                    CATEGORY,
                    format!("'Counter' `{}` is not a number", value.trim()),
                )
            })?;
            custom_counter = true;
            self.doc.remove_variable("BulletCounter");
        }

        for &ordered in &markers[common..] {
            if !custom_counter {
                counter = 1;
            }
            let (default_bullet, default_style) = if ordered {
                ("1.", "DefaultOrderedBulletStyle")
            } else {
                ("*)", "DefaultUnorderedBulletStyle")
            };
            let default_bullet_var = if ordered {
                "DefaultOrderedBullet"
            } else {
                "DefaultUnorderedBullet"
            };
            let template = self
                .resolve("Bullet")
                .unwrap_or_else(|| self.variable_or(default_bullet_var, default_bullet));
            let style = self
                .resolve("BulletStyle")
                .unwrap_or_else(|| self.variable_or(default_style, ""));
            self.doc.remove_variable("Bullet");
            self.doc.remove_variable("BulletStyle");

            let (bullet, numbering) = if ordered {
                let Some(numbering) = OrderedBullet::from_template(&template) else {
                    return Err(self.error(
                        ErrorKind::InvalidNumbering,
                        found.start,
                        found.len,
                        CATEGORY,
                        format!("Unable to determine numbering type for bullet format `{}`", template),
                    ));
                };
                (Bullet::Ordered(numbering.clone()), Some(numbering))
            } else {
                (Bullet::Unordered(template), None)
            };

            self.doc.push(Element::ListBegin(ListBegin { style, bullet }));
            self.state.lists.push(ListFrame {
                ordered,
                counter: 1,
                bullet: numbering,
            });
        }

        if let Some(numbering) = self.state.lists.last().and_then(|frame| frame.bullet.as_ref())
            && let Err(message) = numbering.check_representable(counter)
        {
            return Err(self.error(
                ErrorKind::InvalidNumbering,
                found.start,
                found.len,
                CATEGORY,
                message,
            ));
        }

        let (mut body, end) = read_continued(content, found.end(), true);
        if body.trim().is_empty() {
            return Err(self.error(
                ErrorKind::EmptyContent,
                found.start,
                found.len,
                CATEGORY,
                "List entry cannot be empty",
            ));
        }
        body.push('\n');

        let (parsed, _) = self.sub_parse("[list entry]", body, Some(found.end()))?;
        self.doc.merge_non_elems(&parsed);
        self.doc.push(Element::ListEntry(ListEntry {
            content: parsed.into_tree(),
            counter,
        }));
        if let Some(frame) = self.state.lists.last_mut() {
            frame.counter = counter + 1;
        }
        Ok(end)
    }
}
