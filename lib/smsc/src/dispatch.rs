//! Per-operation orchestration: decode the payload, apply side effects
//! and answer on the session.

use crate::context::CoreContext;
use crate::session::Session;
use smscore::logging;
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use ucp::ops::alert::{self, Alert};
use ucp::ops::deliver::DeliverNotification;
use ucp::ops::session::{ack as bind_ack, nak as bind_nak, SessionOp};
use ucp::ops::submit::Submit;
use ucp::pdu::{Operation, Pdu};
use ucp::support::UcpResult;
use ucp::xser::ExtraServices;

/// Handles one decoded PDU. An error terminates the session.
pub fn handle(ctx: &Arc<CoreContext>, session: &Arc<Session>, pdu: &Pdu) -> UcpResult<()> {
    match Operation::from_code(&pdu.op) {
        Some(Operation::SessionManagement) => handle_bind(ctx, session, pdu),
        Some(Operation::Submit) => handle_submit(ctx, session, pdu),
        Some(Operation::Alert) => handle_alert(ctx, session, pdu),
        Some(Operation::DeliverSm) | Some(Operation::DeliverNotification) => {
            logging::debug!(session.log(), "ignoring inbound deliver operation";
                            "op" => %String::from_utf8_lossy(&pdu.op));
            Ok(())
        }
        None => {
            logging::warn!(session.log(), "unknown operation";
                           "op" => %String::from_utf8_lossy(&pdu.op));
            Ok(())
        }
    }
}

fn handle_bind(ctx: &Arc<CoreContext>, session: &Arc<Session>, pdu: &Pdu) -> UcpResult<()> {
    let bind = SessionOp::parse(pdu)?;

    let password_ok = match bind.password() {
        Ok(password) => password == ctx.config.password,
        Err(defect) => {
            logging::debug!(session.log(), "undecodable bind password"; "defect" => ?defect);
            false
        }
    };
    let authenticated = password_ok && bind.originator() == ctx.config.user;

    let reply = if authenticated {
        session.set_bound();
        logging::info!(session.log(), "bind authenticated"; "client" => bind.originator());
        bind_ack(pdu.trn)
    } else {
        logging::info!(session.log(), "bind rejected"; "client" => bind.originator());
        bind_nak(pdu.trn)
    };

    ctx.metrics.set_last_response(&reply[1..reply.len() - 1]);
    session.write_frame(&reply)?;
    Ok(())
}

fn handle_submit(ctx: &Arc<CoreContext>, session: &Arc<Session>, pdu: &Pdu) -> UcpResult<()> {
    let submit = Submit::parse(pdu)?;

    let services = match submit.extra_services() {
        Ok(services) => services,
        Err(defect) => {
            logging::warn!(session.log(), "unparseable extra services"; "defect" => ?defect);
            ExtraServices::new()
        }
    };

    if let Some(tag) = services.billing_id() {
        let key = String::from_utf8_lossy(tag).into_owned();
        let cost = ctx.config.tariff.get(&key).copied().unwrap_or(0.0);
        logging::debug!(session.log(), "billing identifier"; "key" => &key, "cost" => cost);
        ctx.metrics.add_cost(cost);
    }

    if submit.notification_requested() {
        schedule_notification(ctx, session, &submit);
    }

    let ack = submit.ack(pdu.trn);
    ctx.metrics.set_last_response(&ack[1..ack.len() - 1]);
    session.write_frame(&ack)?;

    ctx.stats.record_submit(&submit, &services);
    Ok(())
}

/// Queues the delayed delivery notification for an accepted submit. The
/// task reacquires the session write lock when the delay elapses, so the
/// ack is always on the wire first.
fn schedule_notification(ctx: &Arc<CoreContext>, session: &Arc<Session>, submit: &Submit) {
    let ctx = ctx.clone();
    let session = session.clone();
    let recipient = submit.recipient();
    let scts = submit.scts.clone();

    thread::spawn(move || {
        thread::sleep(Duration::from_millis(ctx.config.dn_delay_ms));

        let notification = DeliverNotification::new(&ctx.config.access_code, &recipient, &scts);
        let frame = notification.encode();
        ctx.metrics.set_last_response(&frame[1..frame.len() - 1]);

        if let Err(err) = session.write_frame(&frame) {
            logging::warn!(session.log(), "notification write failed"; "error" => %err);
        }
        ctx.metrics.inc_deliver();
    });
}

fn handle_alert(ctx: &Arc<CoreContext>, session: &Arc<Session>, pdu: &Pdu) -> UcpResult<()> {
    let _alert = Alert::parse(pdu)?;

    let reply = alert::ack(pdu.trn);
    ctx.metrics.set_last_response(&reply[1..reply.len() - 1]);

    {
        // The stall deliberately holds the write lock: a frozen SMSC
        // blocks every writer on the socket.
        let mut stream = session.writer();
        let stall = ctx.keepalive.get_and_reset();
        if stall > 0 {
            logging::info!(session.log(), "stalling alert reply"; "seconds" => stall);
            thread::sleep(Duration::from_secs(stall));
        }
        stream.write_all(&reply)?;
        stream.flush()?;
    }

    ctx.stats.record_alert(session.peer());
    Ok(())
}
