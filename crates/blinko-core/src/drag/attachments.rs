use crate::models::{Attachment, AttachmentKind, AttachmentOrderUpdate};

use super::array_move;

/// Result of moving one attachment within its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentReorder {
    /// Full attachment list with `sort_order` set to each position.
    pub attachments: Vec<Attachment>,
    pub updates: Vec<AttachmentOrderUpdate>,
}

/// Move attachment `active` onto `over`, considering only attachments of `kind`.
///
/// Attachments of other kinds keep their slots; the reordered kind is written
/// back into the slots it already occupied. Returns `None` when nothing moves
/// (no target, same item, or either name missing from that kind).
pub fn reorder_attachments(
    attachments: &[Attachment],
    kind: AttachmentKind,
    active: &str,
    over: Option<&str>,
) -> Option<AttachmentReorder> {
    let over = over?;
    if active == over {
        return None;
    }

    let mut same_kind = attachments
        .iter()
        .filter(|attachment| attachment.kind == kind)
        .cloned()
        .collect::<Vec<_>>();
    let from = same_kind.iter().position(|a| a.name == active)?;
    let to = same_kind.iter().position(|a| a.name == over)?;
    array_move(&mut same_kind, from, to);

    let mut reordered = same_kind.into_iter();
    let mut attachments = attachments
        .iter()
        .map(|attachment| {
            if attachment.kind == kind {
                reordered.next().unwrap_or_else(|| attachment.clone())
            } else {
                attachment.clone()
            }
        })
        .collect::<Vec<_>>();

    for (index, attachment) in attachments.iter_mut().enumerate() {
        attachment.sort_order = i64::try_from(index).unwrap_or(i64::MAX);
    }
    let updates = attachments
        .iter()
        .map(|attachment| AttachmentOrderUpdate {
            name: attachment.name.clone(),
            sort_order: attachment.sort_order,
        })
        .collect();

    Some(AttachmentReorder {
        attachments,
        updates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attachment(name: &str, kind: AttachmentKind) -> Attachment {
        Attachment::new(name, format!("/api/file/{name}"), 1, kind).unwrap()
    }

    fn names(attachments: &[Attachment]) -> Vec<&str> {
        attachments.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn reorders_images_around_other_files() {
        let files = vec![
            attachment("a.png", AttachmentKind::Image),
            attachment("doc.pdf", AttachmentKind::Other),
            attachment("b.png", AttachmentKind::Image),
            attachment("c.png", AttachmentKind::Image),
        ];

        let result =
            reorder_attachments(&files, AttachmentKind::Image, "a.png", Some("c.png")).unwrap();
        assert_eq!(names(&result.attachments), vec!["b.png", "doc.pdf", "c.png", "a.png"]);
        assert_eq!(
            result.updates,
            vec![
                AttachmentOrderUpdate { name: "b.png".into(), sort_order: 0 },
                AttachmentOrderUpdate { name: "doc.pdf".into(), sort_order: 1 },
                AttachmentOrderUpdate { name: "c.png".into(), sort_order: 2 },
                AttachmentOrderUpdate { name: "a.png".into(), sort_order: 3 },
            ]
        );
    }

    #[test]
    fn no_op_moves_return_none() {
        let files = vec![
            attachment("a.png", AttachmentKind::Image),
            attachment("doc.pdf", AttachmentKind::Other),
        ];
        assert!(reorder_attachments(&files, AttachmentKind::Image, "a.png", None).is_none());
        assert!(
            reorder_attachments(&files, AttachmentKind::Image, "a.png", Some("a.png")).is_none()
        );
        assert!(
            reorder_attachments(&files, AttachmentKind::Image, "a.png", Some("doc.pdf")).is_none()
        );
    }
}
