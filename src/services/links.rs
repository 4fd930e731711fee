use tracing::{error, info};

use crate::error::AppResult;
use crate::gateway::Repository;
use crate::models::{Event, EventPatch, LinkKind, LinksPatch};

/// Переключает флаг показа ссылки. Запись меняется только после того,
/// как API подтвердил патч; при ошибке возвращается ошибка и ничего не меняется.
pub async fn toggle_link<Rp>(repo: &Rp, event_id: &str, kind: LinkKind) -> AppResult<Event>
where
    Rp: Repository<Event> + ?Sized,
{
    let mut event = repo.get(event_id).await?;
    let shown = !event.links.is_shown(kind);

    let patch = EventPatch {
        links: LinksPatch::show_only(kind, shown),
        ..EventPatch::new(event_id)
    };

    if let Err(e) = repo.update(patch).await {
        error!("Failed to toggle {} on {}: {:?}", kind.show_field(), event_id, e);
        return Err(e.into());
    }

    event.links.set_shown(kind, shown);
    if let Some(version) = event.version {
        event.version = Some(version + 1);
    }
    info!("{} on {} is now {}", kind.label(), event_id, if shown { "shown" } else { "hidden" });
    Ok(event)
}
